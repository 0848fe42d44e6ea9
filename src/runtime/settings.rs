use tracing::warn;

use crate::config;

/// Load settings, falling back to defaults when the file or environment is
/// unusable. Returns the problem, if any, so it can be logged once logging
/// is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

/// Report a config problem on stderr (before the TUI takes the terminal) and
/// in the log.
pub fn report_config_problem(problem: &str) {
    eprintln!("cadenza: {problem}");
    warn!("{problem}");
}
