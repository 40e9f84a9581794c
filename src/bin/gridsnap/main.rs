use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_inspect;
mod cmd_run;
mod cmd_trigger;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт info.
    // Пример: RUST_LOG=debug ./gridsnap run --config snap.json
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:?}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    match cli.cmd {
        cli::Cmd::Run { config, json } => cmd_run::exec(config, json),

        cli::Cmd::Inspect { path, format, json } => cmd_inspect::exec(path, format, json),

        cli::Cmd::Trigger {
            config,
            partition,
            to,
            format,
            json,
        } => cmd_trigger::exec(config, partition, to, format, json),
    }
}
