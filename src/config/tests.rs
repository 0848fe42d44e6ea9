use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn defaults_match_documented_startup_options() {
    let s = Settings::default();
    assert_eq!(s.playback.repeat, RepeatModeSetting::All);
    assert_eq!(s.playback.volume, 70);
    assert!(s.playback.autoplay);
    assert!(!s.playback.shuffle);
    assert_eq!(s.crossfade.seconds, 3.0);
    assert_eq!(s.crossfade.steps, 20);
    assert_eq!(s.ui.visualizer, VisualizerStyle::None);
    assert_eq!(s.ui.progress_poll_ms, 500);
    assert_eq!(s.library.extensions.len(), 7);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_steps_and_negative_crossfade() {
    let mut s = Settings::default();
    s.crossfade.steps = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.crossfade.seconds = -1.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.volume = 101;
    assert!(s.validate().is_err());
}

#[test]
fn validate_bounds_crossfade_length() {
    let mut s = Settings::default();
    s.crossfade.seconds = 1e30;
    assert!(s.validate().unwrap_err().contains("crossfade.seconds"));

    s.crossfade.seconds = f64::NAN;
    assert!(s.validate().is_err());

    s.crossfade.seconds = MAX_CROSSFADE_SECS;
    assert!(s.validate().is_ok());
    s.crossfade.seconds = 0.0;
    assert!(s.validate().is_ok());
}

#[test]
fn resolve_config_path_prefers_cadenza_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", "/tmp/cadenza-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadenza-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
repeat = "repeat-one"
shuffle = true
volume = 40
autoplay = false

[crossfade]
seconds = 5.5
steps = 8

[library]
folder = "/media/usb/music"
extensions = ["mp3"]

[ui]
visualizer = "vu-meter"
header_text = "hello"
progress_poll_ms = 250

[controls]
skip_seconds = 15
volume_step = 2
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CADENZA__CROSSFADE__SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.repeat, RepeatModeSetting::One);
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.volume, 40);
    assert!(!s.playback.autoplay);
    assert_eq!(s.crossfade.seconds, 5.5);
    assert_eq!(s.crossfade.steps, 8);
    assert_eq!(
        s.library.folder,
        Some(std::path::PathBuf::from("/media/usb/music"))
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert_eq!(s.ui.visualizer, VisualizerStyle::VuMeter);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.progress_poll_ms, 250);
    // untouched keys keep their defaults
    assert_eq!(s.ui.frame_ms, 50);
    assert_eq!(s.controls.skip_seconds, 15);
    assert_eq!(s.controls.volume_step, 2);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[crossfade]
steps = 20
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CADENZA__CROSSFADE__STEPS", "4");

    let s = Settings::load().unwrap();
    assert_eq!(s.crossfade.steps, 4);
}

#[test]
fn visualizer_cycles_through_all_styles() {
    let mut v = VisualizerStyle::None;
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(v.label());
        v = v.cycle();
    }
    assert_eq!(seen, vec!["none", "vu_meter", "spectrum", "wave"]);
    assert_eq!(v, VisualizerStyle::None);
}
