//! File-backed `tracing` setup. The terminal is owned by the UI, so records
//! never go to stdout or stderr.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file location: `LYRE_LOG_FILE`, else `$XDG_STATE_HOME/lyre/lyre.log`,
/// else `~/.local/state/lyre/lyre.log`.
fn log_path(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(p) = var("LYRE_LOG_FILE") {
        return Some(PathBuf::from(p));
    }
    let state_home = var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|h| PathBuf::from(h).join(".local").join("state")))?;
    Some(state_home.join("lyre").join("lyre.log"))
}

/// Install the global subscriber. Any failure leaves logging disabled.
pub fn init() {
    let Some(path) = log_path(|k| std::env::var_os(k)) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("LYRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init();
}
