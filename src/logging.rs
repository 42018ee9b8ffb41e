//! Logging setup
//!
//! Hosts embedding the tables usually own stdout, so logs go to a file through
//! a non-blocking writer. The returned guard must be held for as long as
//! logging is needed.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Level that disables logging altogether
const LEVEL_OFF: &str = "off";

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `None` when
/// logging is off.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if config.level.eq_ignore_ascii_case(LEVEL_OFF) {
        return Ok(None);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level))?,
    };

    let log_path = config.file.clone().unwrap_or_else(get_log_path);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::info!("gcp-tables logging at {}", config.level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcp-tables").join("gcp-tables.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcp-tables").join("gcp-tables.log");
    }
    PathBuf::from("gcp-tables.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_installs_nothing() {
        let config = LoggingConfig {
            level: "OFF".to_string(),
            file: None,
        };
        assert!(setup_logging(&config).unwrap().is_none());
    }

    #[test]
    fn test_log_path_file_name() {
        assert_eq!(
            get_log_path().file_name().and_then(|n| n.to_str()),
            Some("gcp-tables.log")
        );
    }
}
