//! Общие константы форматов снапшотов (native/json) и конфигурации.

// -------- Native snapshot file --------
// Header: [magic8="GSNAP001"][name_len u32][name bytes]
// Record: [klen u32][vlen u32][crc32 u32] + key + value
pub const NATIVE_MAGIC: &[u8; 8] = b"GSNAP001";
pub const NATIVE_HDR_FIXED: usize = 8 + 4;
pub const NATIVE_REC_HDR_SIZE: usize = 4 + 4 + 4;
pub const NATIVE_EXT: &str = "gsnap";

// -------- JSON snapshot file --------
pub const JSON_EXT: &str = "json";

// Суффикс временного файла при атомарной записи (tmp + rename).
pub const TMP_SUFFIX: &str = "tmp";

// -------- Env (configuration) --------
pub const ENV_PARTITION: &str = "GS_SNAPSHOT_PARTITION";
pub const ENV_IMPORTS: &str = "GS_SNAPSHOT_IMPORTS";
pub const ENV_EXPORTS: &str = "GS_SNAPSHOT_EXPORTS";
pub const ENV_FORMAT: &str = "GS_SNAPSHOT_FORMAT";
