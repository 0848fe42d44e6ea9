use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{PlayerError, Result};

use super::model::Track;
use super::probe::DurationProbe;

/// Case-insensitive extension check against the configured audio extensions.
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn probe_track(path: &Path, probe: &dyn DurationProbe) -> Track {
    let duration = probe.probe(path).unwrap_or_else(|| {
        warn!(error = %PlayerError::ProbeFailure(path.to_path_buf()), "progress bar disabled for track");
        Default::default()
    });
    Track::new(path, duration)
}

/// List the audio files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Every file is probed once for its
/// duration; probe failures degrade to an unknown (zero) duration.
pub fn scan(dir: &Path, settings: &LibrarySettings, probe: &dyn DurationProbe) -> Result<Vec<Track>> {
    if !dir.is_dir() {
        return Err(PlayerError::FolderNotFound(dir.to_path_buf()));
    }

    let mut tracks = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.map_err(|err| debug!(%err, "skipping unreadable entry")).ok())
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            tracks.push(probe_track(path, probe));
        }
    }

    if tracks.is_empty() {
        return Err(PlayerError::NoAudioFilesFound(dir.to_path_buf()));
    }

    debug!(folder = %dir.display(), count = tracks.len(), "scanned folder");
    Ok(tracks)
}

/// Build tracks from individually chosen files, dropping anything that is not
/// an existing audio file.
pub fn scan_files(paths: &[PathBuf], settings: &LibrarySettings, probe: &dyn DurationProbe) -> Vec<Track> {
    paths
        .iter()
        .filter(|p| {
            let keep = p.is_file() && is_audio_file(p, settings);
            if !keep {
                warn!(path = %p.display(), "ignoring non-audio file");
            }
            keep
        })
        .map(|p| probe_track(p, probe))
        .collect()
}
