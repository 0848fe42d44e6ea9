use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub crossfade: CrossfadeSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Repeat mode at startup.
    pub repeat: RepeatModeSetting,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Start volume, 0-100.
    pub volume: u8,
    /// Start playing the first track as soon as the folder is loaded.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            repeat: RepeatModeSetting::All,
            shuffle: false,
            volume: 70,
            autoplay: true,
        }
    }
}

/// Longest crossfade accepted from the config file or the command line.
pub const MAX_CROSSFADE_SECS: f64 = 30.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrossfadeSettings {
    /// Crossfade duration in seconds. Set to 0 to disable crossfade.
    pub seconds: f64,
    /// Number of discrete volume steps per ramp.
    pub steps: u32,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            seconds: 3.0,
            steps: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder scanned at startup. `None` means the platform music directory.
    pub folder: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            folder: None,
            extensions: ["mp3", "wav", "ogg", "flac", "m4a", "aac", "wma"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Visualizer shown above the playlist.
    pub visualizer: VisualizerStyle,
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How often the engine clock is polled to correct the position estimate.
    pub progress_poll_ms: u64,
    /// How often the engine is asked for end-of-stream notifications.
    pub end_check_ms: u64,
    /// Redraw interval for the progress bar and visualizer.
    pub frame_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            visualizer: VisualizerStyle::None,
            header_text: " ~ cadenza ~ ".to_string(),
            progress_poll_ms: 500,
            end_check_ms: 200,
            frame_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds jumped by the `+` / `-` keys.
    pub skip_seconds: i32,
    /// Volume change applied by the up/down keys.
    pub volume_step: i16,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            skip_seconds: 10,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file. `None` means `$XDG_STATE_HOME/cadenza/cadenza.log`.
    pub file: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "none", alias = "no-repeat")]
    Off,
    #[serde(alias = "playlist", alias = "loop-all")]
    All,
    #[serde(alias = "single", alias = "repeat-one")]
    One,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VisualizerStyle {
    None,
    #[serde(alias = "vu-meter", alias = "vu")]
    #[value(name = "vu_meter", alias = "vu-meter")]
    VuMeter,
    Spectrum,
    Wave,
}

impl VisualizerStyle {
    /// The next style in the cycle `none -> vu_meter -> spectrum -> wave -> none`.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::VuMeter,
            Self::VuMeter => Self::Spectrum,
            Self::Spectrum => Self::Wave,
            Self::Wave => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::VuMeter => "vu_meter",
            Self::Spectrum => "spectrum",
            Self::Wave => "wave",
        }
    }
}

impl From<RepeatModeSetting> for crate::playback::RepeatMode {
    fn from(setting: RepeatModeSetting) -> Self {
        match setting {
            RepeatModeSetting::Off => Self::Off,
            RepeatModeSetting::All => Self::All,
            RepeatModeSetting::One => Self::One,
        }
    }
}
