//! Snapshot file codec of the bundled grid engines.
//!
//! Native (little endian):
//!   header: [magic8="GSNAP001"][name_len u32][name bytes]
//!   record: [klen u32][vlen u32][crc32 u32] + key + value
//!   crc32 считается по [klen][vlen] + key + value. Обрыв записи или неверный crc: ошибка.
//!
//! Json:
//!   {"partition":"<name>","entries":[{"key":"<b64>","value":"<b64>"}, ...]}
//!
//! Запись атомарная: <file>.tmp + fsync + rename.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher as Crc32;
use serde::{Deserialize, Serialize};

use crate::consts::{NATIVE_HDR_FIXED, NATIVE_MAGIC, NATIVE_REC_HDR_SIZE, TMP_SUFFIX};
use crate::metrics::{record_entries_read, record_entries_written};
use crate::snapshot::SnapshotFormat;

/// Decoded snapshot file: the partition it was taken from plus its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub partition: String,
    pub entries: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Inspect summary (CLI `inspect`).
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotFileSummary {
    pub path: String,
    pub format: SnapshotFormat,
    pub partition: String,
    pub entries: u64,
    pub key_bytes: u64,
    pub value_bytes: u64,
    pub file_bytes: u64,
}

#[derive(Serialize, Deserialize)]
struct JsonSnapshot {
    partition: String,
    entries: Vec<JsonEntry>,
}

#[derive(Serialize, Deserialize)]
struct JsonEntry {
    key: String,
    value: String,
}

/// File name a partition snapshot gets inside an export directory.
/// Distinct partition names always give distinct file names ('%' and '/' are percent-escaped).
pub fn snapshot_file_name(partition: &str, format: SnapshotFormat) -> String {
    let stem = partition
        .trim_start_matches('/')
        .replace('%', "%25")
        .replace('/', "%2F");
    format!("{}.{}", stem, format.extension())
}

/// Write a snapshot file atomically. Returns the number of bytes written.
pub fn write_snapshot_file(
    path: &Path,
    format: SnapshotFormat,
    partition: &str,
    entries: &[(Vec<u8>, Vec<u8>)],
) -> Result<u64> {
    let bytes = match format {
        SnapshotFormat::Native => encode_native(partition, entries)?,
        SnapshotFormat::Json => encode_json(partition, entries)?,
    };

    let tmp = tmp_path(path);
    if let Err(e) = write_then_rename(&tmp, path, &bytes) {
        // Брошенный .tmp попал бы в следующий store-wide import этого каталога.
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    record_entries_written(entries.len(), bytes.len() as u64);
    Ok(bytes.len() as u64)
}

pub fn read_snapshot_file(path: &Path, format: SnapshotFormat) -> Result<SnapshotFile> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file = match format {
        SnapshotFormat::Native => decode_native(&bytes),
        SnapshotFormat::Json => decode_json(&bytes),
    }
    .with_context(|| format!("decode {} snapshot {}", format, path.display()))?;
    record_entries_read(file.entries.len());
    Ok(file)
}

pub fn summarize_snapshot_file(path: &Path, format: SnapshotFormat) -> Result<SnapshotFileSummary> {
    let file_bytes = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    let file = read_snapshot_file(path, format)?;
    let key_bytes = file.entries.iter().map(|(k, _)| k.len() as u64).sum();
    let value_bytes = file.entries.iter().map(|(_, v)| v.len() as u64).sum();
    Ok(SnapshotFileSummary {
        path: path.display().to_string(),
        format,
        partition: file.partition,
        entries: file.entries.len() as u64,
        key_bytes,
        value_bytes,
        file_bytes,
    })
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(tmp)
            .with_context(|| format!("open {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write {}", tmp.display()))?;
        let _ = f.sync_all();
    }
    fs::rename(tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

// ---------------- native ----------------

fn encode_native(partition: &str, entries: &[(Vec<u8>, Vec<u8>)]) -> Result<Vec<u8>> {
    let name = partition.as_bytes();
    let name_len = u32::try_from(name.len()).map_err(|_| anyhow!("partition name too long"))?;

    let mut out = Vec::with_capacity(NATIVE_HDR_FIXED + name.len());
    out.extend_from_slice(NATIVE_MAGIC);
    let mut len4 = [0u8; 4];
    LittleEndian::write_u32(&mut len4, name_len);
    out.extend_from_slice(&len4);
    out.extend_from_slice(name);

    for (k, v) in entries {
        let klen = u32::try_from(k.len()).map_err(|_| anyhow!("key too long: {} bytes", k.len()))?;
        let vlen =
            u32::try_from(v.len()).map_err(|_| anyhow!("value too long: {} bytes", v.len()))?;

        let mut hdr = [0u8; NATIVE_REC_HDR_SIZE];
        LittleEndian::write_u32(&mut hdr[0..4], klen);
        LittleEndian::write_u32(&mut hdr[4..8], vlen);

        let mut hasher = Crc32::new();
        hasher.update(&hdr[0..8]);
        hasher.update(k);
        hasher.update(v);
        LittleEndian::write_u32(&mut hdr[8..12], hasher.finalize());

        out.extend_from_slice(&hdr);
        out.extend_from_slice(k);
        out.extend_from_slice(v);
    }
    Ok(out)
}

fn decode_native(bytes: &[u8]) -> Result<SnapshotFile> {
    if bytes.len() < NATIVE_HDR_FIXED || &bytes[0..8] != NATIVE_MAGIC {
        return Err(anyhow!("bad native snapshot magic"));
    }
    let name_len = LittleEndian::read_u32(&bytes[8..12]) as usize;
    let name_end = NATIVE_HDR_FIXED
        .checked_add(name_len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| anyhow!("truncated native snapshot header"))?;
    let partition = std::str::from_utf8(&bytes[NATIVE_HDR_FIXED..name_end])
        .map_err(|_| anyhow!("partition name is not valid UTF-8"))?
        .to_string();

    let mut entries = Vec::new();
    let mut pos = name_end;
    while pos < bytes.len() {
        if bytes.len() - pos < NATIVE_REC_HDR_SIZE {
            return Err(anyhow!("truncated record header at offset {}", pos));
        }
        let hdr = &bytes[pos..pos + NATIVE_REC_HDR_SIZE];
        let klen = LittleEndian::read_u32(&hdr[0..4]) as usize;
        let vlen = LittleEndian::read_u32(&hdr[4..8]) as usize;
        let crc_expected = LittleEndian::read_u32(&hdr[8..12]);

        let body_start = pos + NATIVE_REC_HDR_SIZE;
        let body_end = body_start
            .checked_add(klen)
            .and_then(|v| v.checked_add(vlen))
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| anyhow!("truncated record body at offset {}", pos))?;

        let key = &bytes[body_start..body_start + klen];
        let value = &bytes[body_start + klen..body_end];

        let mut hasher = Crc32::new();
        hasher.update(&hdr[0..8]);
        hasher.update(key);
        hasher.update(value);
        let crc_actual = hasher.finalize();
        if crc_actual != crc_expected {
            return Err(anyhow!(
                "record crc mismatch at offset {} (expected {:08x}, got {:08x})",
                pos,
                crc_expected,
                crc_actual
            ));
        }

        entries.push((key.to_vec(), value.to_vec()));
        pos = body_end;
    }

    Ok(SnapshotFile { partition, entries })
}

// ---------------- json ----------------

fn encode_json(partition: &str, entries: &[(Vec<u8>, Vec<u8>)]) -> Result<Vec<u8>> {
    let b64 = base64::engine::general_purpose::STANDARD;
    let doc = JsonSnapshot {
        partition: partition.to_string(),
        entries: entries
            .iter()
            .map(|(k, v)| JsonEntry {
                key: b64.encode(k),
                value: b64.encode(v),
            })
            .collect(),
    };
    serde_json::to_vec_pretty(&doc).context("serialize json snapshot")
}

fn decode_json(bytes: &[u8]) -> Result<SnapshotFile> {
    let b64 = base64::engine::general_purpose::STANDARD;
    let doc: JsonSnapshot = serde_json::from_slice(bytes).context("parse json snapshot")?;
    let mut entries = Vec::with_capacity(doc.entries.len());
    for (i, e) in doc.entries.into_iter().enumerate() {
        let k = b64
            .decode(e.key.as_bytes())
            .with_context(|| format!("entry #{}: bad base64 key", i))?;
        let v = b64
            .decode(e.value.as_bytes())
            .with_context(|| format!("entry #{}: bad base64 value", i))?;
        entries.push((k, v));
    }
    Ok(SnapshotFile {
        partition: doc.partition,
        entries,
    })
}
