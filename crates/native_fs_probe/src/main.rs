//! nfprobe - inspect and manipulate paths through native_fs

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Cli;
use native_fs::FsConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match &cli.config {
        Some(path) => (FsConfig::load_from(path)?, None),
        None => match FsConfig::load() {
            Ok(config) => (config, None),
            Err(e) => (FsConfig::default(), Some(e)),
        },
    };

    let _log_guard = native_fs_log::init(&native_fs_log::LogOptions {
        level: config.logging.level.clone(),
        log_to_file: config.logging.log_to_file,
    })?;

    if let Some(e) = load_error {
        tracing::warn!("Failed to load config, using defaults: {}", e);
    }

    if config.logging.log_to_file {
        if let Err(e) = native_fs_log::cleanup_old_logs(config.logging.retain_days) {
            tracing::warn!("Failed to cleanup old logs: {}", e);
        }
    }

    native_fs::init(&config);

    for line in commands::execute(&cli.command)? {
        println!("{}", line);
    }
    Ok(())
}
