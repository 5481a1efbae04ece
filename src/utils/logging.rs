//! Diagnostic log setup.
//!
//! The interactive UI owns the terminal, so chat sessions only log when a
//! file is given. Headless runs log to stderr.

use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where diagnostic output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Disabled,
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn open_log_file(path: &Path) -> Result<File, Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Installs the global subscriber for `target`. `default_directive` applies
/// when `RUST_LOG` is unset or invalid.
pub fn init_tracing(target: LogTarget<'_>, default_directive: &str) -> Result<(), Box<dyn Error>> {
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(default_directive))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter(default_directive))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|err| err as Box<dyn Error>),
    }
}
