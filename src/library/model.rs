use std::path::{Path, PathBuf};
use std::time::Duration;

/// One playable file. Built once by the scanner and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    /// File name shown in the playlist.
    pub name: String,
    /// Probed length; `Duration::ZERO` when the probe failed.
    pub duration: Duration,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            path,
            name,
            duration,
        }
    }

    /// Whether the probe produced a usable length for the progress bar.
    pub fn has_duration(&self) -> bool {
        !self.duration.is_zero()
    }
}

/// Ordered, index-addressed list of tracks.
///
/// Replaced wholesale on folder reload; only ever grows otherwise.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.tracks.iter().any(|t| t.path == path)
    }

    /// Append tracks whose path is not already present. Returns how many were added.
    pub fn extend_unique(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let before = self.tracks.len();
        for t in tracks {
            if !self.contains_path(&t.path) {
                self.tracks.push(t);
            }
        }
        self.tracks.len() - before
    }
}
