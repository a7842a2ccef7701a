use tracing::warn;

use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!(%msg, "invalid config, using defaults");
                eprintln!("lyre: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            warn!(err = %e, "failed to load config, using defaults");
            eprintln!("lyre: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
