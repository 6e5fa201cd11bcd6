use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "chatbot.log";

/// Route tracing output to a log file; the terminal belongs to the TUI.
///
/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(guard)
}

fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;
    Ok(data_dir.join("gemini-chat").join("logs"))
}
