use std::{env, path::PathBuf};

use super::schema::{MAX_CROSSFADE_SECS, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `CADENZA__`), and falls back to struct defaults.
impl Settings {
    /// Load settings from the optional config file and environment.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENZA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.crossfade.steps == 0 {
            return Err("crossfade.steps must be >= 1".to_string());
        }
        if !(0.0..=MAX_CROSSFADE_SECS).contains(&self.crossfade.seconds) {
            return Err(format!(
                "crossfade.seconds must be within 0..={MAX_CROSSFADE_SECS}"
            ));
        }
        if self.playback.volume > 100 {
            return Err("playback.volume must be within 0..=100".to_string());
        }
        if self.ui.progress_poll_ms == 0 || self.ui.end_check_ms == 0 || self.ui.frame_ms == 0 {
            return Err("ui timer intervals must be > 0".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `CADENZA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENZA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadenza/config.toml`
/// or `~/.config/cadenza/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("cadenza").join("config.toml"))
}

/// Default music folder: `~/Music`, or `./Music` without a home directory.
pub fn default_music_folder() -> PathBuf {
    env::var_os("HOME")
        .map(|h| PathBuf::from(h).join("Music"))
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// Default log file under `$XDG_STATE_HOME/cadenza/` or `~/.local/state/cadenza/`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("cadenza").join("cadenza.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
