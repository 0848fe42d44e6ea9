//! Command-line flags. Anything given here wins over the config file and
//! environment.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{MAX_CROSSFADE_SECS, RepeatModeSetting, Settings, VisualizerStyle};

#[derive(Parser, Debug, Default)]
#[command(name = "cadenza")]
#[command(about = "Terminal music player with gapless crossfades")]
#[command(version)]
pub struct Args {
    /// Folder to scan for audio files (defaults to ~/Music)
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Repeat mode at startup
    #[arg(short, long, value_enum)]
    pub repeat: Option<RepeatModeSetting>,

    /// Start volume, 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: Option<u8>,

    /// Start playing as soon as the folder is loaded
    #[arg(long, overrides_with = "no_autoplay")]
    pub autoplay: bool,

    /// Load the first track but wait for play
    #[arg(long, overrides_with = "autoplay")]
    pub no_autoplay: bool,

    /// Crossfade length in seconds (at most 30), 0 disables
    #[arg(long, value_parser = parse_crossfade)]
    pub crossfade: Option<f64>,

    /// Visualizer style
    #[arg(long, value_enum)]
    pub visualizer: Option<VisualizerStyle>,

    /// Start with shuffle on
    #[arg(short, long)]
    pub shuffle: bool,

    /// Extra files appended to the playlist after the folder scan
    #[arg(long, num_args = 1..)]
    pub add: Vec<PathBuf>,

    /// Log file (defaults to $XDG_STATE_HOME/cadenza/cadenza.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_crossfade(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=MAX_CROSSFADE_SECS).contains(&secs) {
        return Err(format!("crossfade must be within 0..={MAX_CROSSFADE_SECS} seconds"));
    }
    Ok(secs)
}

impl Args {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(folder) = &self.folder {
            settings.library.folder = Some(folder.clone());
        }
        if let Some(repeat) = self.repeat {
            settings.playback.repeat = repeat;
        }
        if let Some(volume) = self.volume {
            settings.playback.volume = volume;
        }
        if self.autoplay {
            settings.playback.autoplay = true;
        }
        if self.no_autoplay {
            settings.playback.autoplay = false;
        }
        if let Some(secs) = self.crossfade {
            settings.crossfade.seconds = secs;
        }
        if let Some(style) = self.visualizer {
            settings.ui.visualizer = style;
        }
        if self.shuffle {
            settings.playback.shuffle = true;
        }
        if let Some(file) = &self.log_file {
            settings.logging.file = Some(file.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cadenza").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_leave_settings_alone() {
        let mut settings = Settings::default();
        parse(&[]).apply(&mut settings);
        assert_eq!(settings.playback.volume, 70);
        assert!(settings.playback.autoplay);
        assert_eq!(settings.playback.repeat, RepeatModeSetting::All);
        assert_eq!(settings.crossfade.seconds, 3.0);
        assert_eq!(settings.library.folder, None);
    }

    #[test]
    fn flags_override_settings() {
        let mut settings = Settings::default();
        parse(&[
            "--folder",
            "/media/usb/music",
            "--repeat",
            "one",
            "--volume",
            "40",
            "--no-autoplay",
            "--crossfade",
            "0",
            "--visualizer",
            "vu_meter",
            "--shuffle",
        ])
        .apply(&mut settings);

        assert_eq!(settings.library.folder, Some(PathBuf::from("/media/usb/music")));
        assert_eq!(settings.playback.repeat, RepeatModeSetting::One);
        assert_eq!(settings.playback.volume, 40);
        assert!(!settings.playback.autoplay);
        assert_eq!(settings.crossfade.seconds, 0.0);
        assert_eq!(settings.ui.visualizer, VisualizerStyle::VuMeter);
        assert!(settings.playback.shuffle);
    }

    #[test]
    fn last_autoplay_flag_wins() {
        let args = parse(&["--no-autoplay", "--autoplay"]);
        assert!(args.autoplay);
        assert!(!args.no_autoplay);
    }

    #[test]
    fn add_takes_several_files() {
        let args = parse(&["--add", "a.mp3", "b.flac"]);
        assert_eq!(args.add, vec![PathBuf::from("a.mp3"), PathBuf::from("b.flac")]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Args::try_parse_from(["cadenza", "--volume", "101"]).is_err());
        assert!(Args::try_parse_from(["cadenza", "--crossfade=-1"]).is_err());
        assert!(Args::try_parse_from(["cadenza", "--crossfade", "soon"]).is_err());
        assert!(Args::try_parse_from(["cadenza", "--crossfade", "1e30"]).is_err());
        assert!(Args::try_parse_from(["cadenza", "--crossfade", "inf"]).is_err());
        assert!(Args::try_parse_from(["cadenza", "--repeat", "twice"]).is_err());
    }

    #[test]
    fn visualizer_accepts_dashed_alias() {
        let args = parse(&["--visualizer", "vu-meter"]);
        assert_eq!(args.visualizer, Some(VisualizerStyle::VuMeter));
    }
}
