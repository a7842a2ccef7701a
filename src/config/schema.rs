use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lyre/config.toml` or `~/.config/lyre/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYRE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial volume in percent. Values above 100 are clamped.
    pub volume: u8,
    /// How many commands may wait for the worker before new ones are dropped.
    pub command_capacity: usize,
    /// Worker idle tick (milliseconds). Each tick pumps the engine once.
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 10,
            command_capacity: 16,
            tick_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether to follow symlinks while building the queue.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Redraw and dirty-flag poll interval (milliseconds).
    pub poll_ms: u64,
    /// Volume change per `+` / `-` key press, in percent.
    pub volume_step: u8,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ lyre ~ ".to_string(),
            poll_ms: 100,
            volume_step: 5,
        }
    }
}
