use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{LoggingSettings, default_log_path};

/// Where the log goes: the configured file, else the XDG state directory.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

/// Install the global subscriber writing to the log file.
///
/// The terminal belongs to the TUI, so nothing is ever logged to stdout or
/// stderr. `RUST_LOG` overrides the configured level.
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let Some(path) = log_path(settings) else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;
    Ok(Some(path))
}
