//! Application model types: `App` and `StatusLine`.

use std::path::PathBuf;

use crate::config::VisualizerStyle;
use crate::error::PlayerError;

/// One-line message shown in the status box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// View state owned by the runtime. Playback state itself lives in the
/// session; this only tracks what the user is looking at.
pub struct App {
    /// Playlist row under the cursor.
    pub selected: usize,
    /// Whether the cursor jumps to the playing track when it changes.
    pub follow_playback: bool,
    pub visualizer: VisualizerStyle,
    pub metadata_window: bool,
    pub current_dir: Option<PathBuf>,
    /// Frame counter driving the visualizer animation.
    pub animation_tick: u64,
    status: Option<StatusLine>,
}

impl App {
    pub fn new(visualizer: VisualizerStyle) -> Self {
        Self {
            selected: 0,
            follow_playback: true,
            visualizer,
            metadata_window: false,
            current_dir: None,
            animation_tick: 0,
            status: None,
        }
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor onto the playing track when following playback.
    pub fn follow(&mut self, playing: Option<usize>) {
        if let Some(idx) = playing.filter(|_| self.follow_playback) {
            self.selected = idx;
        }
    }

    /// Set the cursor, clamped to a playlist of `len` tracks.
    pub fn set_selected(&mut self, idx: usize, len: usize) {
        self.selected = idx.min(len.saturating_sub(1));
    }

    /// Move the cursor down, wrapping to the first track.
    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the last track.
    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected.min(len - 1) + len - 1) % len;
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn cycle_visualizer(&mut self) -> VisualizerStyle {
        self.visualizer = self.visualizer.cycle();
        self.visualizer
    }

    pub fn advance_animation(&mut self) {
        self.animation_tick = self.animation_tick.wrapping_add(1);
    }

    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = Some(dir);
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    /// Show `err` in the status box.
    pub fn report(&mut self, err: &PlayerError) {
        self.status = Some(StatusLine {
            text: err.to_string(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}
