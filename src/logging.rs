//! Logging configuration for querydesk.
//!
//! Installs the process-wide tracing subscriber once at startup. Components
//! receive their own span at construction and log inside it.

use crate::error::{QueryDeskError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initializes logging to a file.
///
/// Location: `~/.local/state/querydesk/querydesk.log` on Linux (XDG state directory),
/// or the platform-appropriate state/config directory on other systems.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging to stderr, keeping stdout clean for command output.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Returns the path for the log file.
///
/// Uses XDG state directory on Linux (`~/.local/state/querydesk/querydesk.log`),
/// or falls back to config directory on other platforms.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("querydesk").join("querydesk.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("querydesk").join("querydesk.log");
    }

    std::env::temp_dir().join("querydesk.log")
}

/// Copies the log file at `src` to `dest` so it can be attached to a bug
/// report, leaving `src` untouched. Returns the number of bytes written.
pub fn export_log_file(src: &Path, dest: &Path) -> Result<u64> {
    if !src.exists() {
        return Err(QueryDeskError::config(format!(
            "No log file at {} (run with --log-file to record one)",
            src.display()
        )));
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            QueryDeskError::internal(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }
    fs::copy(src, dest)
        .map_err(|e| QueryDeskError::internal(format!("Failed to export logs: {e}")))
}
