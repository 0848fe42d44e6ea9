use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::App;
use crate::config::{self, Settings};
use crate::library::{DurationProbe, LoftyProbe, Playlist, scan, scan_files};
use crate::playback::{AudioEngine, ControlEvent, PlaybackSession, SessionOptions, SystemClock};

/// Session start-up values from the merged settings.
pub fn session_options(settings: &Settings) -> SessionOptions {
    SessionOptions {
        volume: settings.playback.volume,
        repeat: settings.playback.repeat.into(),
        shuffle: settings.playback.shuffle,
        crossfade: Duration::try_from_secs_f64(settings.crossfade.seconds).unwrap_or_default(),
        crossfade_steps: settings.crossfade.steps,
    }
}

pub fn build_session(
    engine: Box<dyn AudioEngine>,
    events: Sender<ControlEvent>,
    settings: &Settings,
) -> PlaybackSession {
    PlaybackSession::new(
        engine,
        Arc::new(SystemClock),
        events,
        session_options(settings),
    )
}

/// The folder to scan: configured or given on the command line, else `~/Music`.
pub fn music_folder(settings: &Settings) -> PathBuf {
    settings
        .library
        .folder
        .clone()
        .unwrap_or_else(config::default_music_folder)
}

/// Scan the music folder into the session, then append `extra` files.
///
/// Failures end up in the status line; the player still starts with whatever
/// could be loaded.
pub fn load_library(
    session: &mut PlaybackSession,
    app: &mut App,
    settings: &Settings,
    extra: &[PathBuf],
) {
    load_library_with(session, app, settings, extra, &LoftyProbe);
}

pub(super) fn load_library_with(
    session: &mut PlaybackSession,
    app: &mut App,
    settings: &Settings,
    extra: &[PathBuf],
    probe: &dyn DurationProbe,
) {
    let folder = music_folder(settings);
    app.set_current_dir(folder.clone());
    let autoplay = settings.playback.autoplay;

    scan_folder(session, app, settings, &folder, probe, autoplay);

    if !extra.is_empty() {
        let was_empty = session.playlist().is_empty();
        let tracks = scan_files(extra, &settings.library, probe);
        let added = session.add_tracks(tracks);
        info!(added, "extra files appended");
        if added > 0 {
            app.set_status(format!(
                "{} tracks ({} added from the command line)",
                session.playlist().len(),
                added
            ));
        }
        if was_empty && added > 0 {
            let start = if autoplay {
                session.play_index(0)
            } else {
                session.load(0)
            };
            if let Err(e) = start {
                app.report(&e);
            }
        }
    }

    app.follow(session.current_index());
}

fn scan_folder(
    session: &mut PlaybackSession,
    app: &mut App,
    settings: &Settings,
    folder: &Path,
    probe: &dyn DurationProbe,
    autoplay: bool,
) {
    match scan(folder, &settings.library, probe) {
        Ok(tracks) => {
            let count = tracks.len();
            info!(folder = %folder.display(), count, "library scanned");
            match session.set_playlist(Playlist::new(tracks), autoplay) {
                Ok(()) => app.set_status(format!("Loaded {count} tracks")),
                Err(e) => {
                    warn!(error = %e, "could not start the first track");
                    app.report(&e);
                }
            }
        }
        Err(e) => {
            warn!(folder = %folder.display(), error = %e, "library scan failed");
            app.report(&e);
            if let Err(e) = session.set_playlist(Playlist::default(), false) {
                app.report(&e);
            }
        }
    }
}
