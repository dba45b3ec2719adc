//! Diagnostic logging setup for the binary.
//!
//! Library code only emits `tracing` events; the subscriber is installed here,
//! once, before any command runs.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(to_file: bool) -> &'static str {
    if to_file {
        "artrestorer=info,warn"
    } else {
        "warn"
    }
}

fn build_filter(to_file: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(to_file)))
}

/// Install the global subscriber. With a `log_file`, events are appended there
/// without ANSI colors; otherwise they go to stderr.
pub fn init(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(build_filter(true))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(build_filter(false))
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
    }
    Ok(())
}
