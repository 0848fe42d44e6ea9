//! The playback state machine.
//!
//! `PlaybackSession` owns the engine, the playlist and the current index, and
//! is only ever touched from the driver thread. Everything asynchronous (engine
//! end-of-stream callbacks, crossfade workers) arrives as a [`ControlEvent`]
//! through the channel handed to [`PlaybackSession::new`].

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::clock::Clock;
use super::crossfade::{FadeHandle, FadeMessage, FadePlan, FadeStep, spawn_fade};
use super::engine::AudioEngine;
use super::equalizer::{Equalizer, Preset};
use super::events::ControlEvent;
use super::position::PositionTracker;
use super::transition::{EndAction, RepeatMode, TransitionController};
use crate::error::{EngineError, PlayerError, Result};
use crate::library::{Playlist, Track};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing playing; the engine holds no active media.
    #[default]
    Stopped,
    /// Media loaded at position zero, not started yet.
    Loaded,
    Playing,
    Paused,
    /// The user is dragging the seek slider, or a seek is in flight.
    Seeking,
    /// A crossfade worker owns the volume.
    Fading,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Loaded => "Loaded",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Seeking => "Seeking",
            Self::Fading => "Crossfading",
        }
    }
}

/// Start-up values for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub volume: u8,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    /// Zero disables crossfading.
    pub crossfade: Duration,
    pub crossfade_steps: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            volume: 70,
            repeat: RepeatMode::All,
            shuffle: false,
            crossfade: Duration::from_secs(3),
            crossfade_steps: 20,
        }
    }
}

pub struct PlaybackSession {
    engine: Box<dyn AudioEngine>,
    events: Sender<ControlEvent>,
    playlist: Playlist,
    current: Option<usize>,
    state: PlaybackState,
    /// State to return to when a drag-seek ends.
    seek_return: Option<PlaybackState>,
    position: PositionTracker,
    transitions: TransitionController,
    /// User-chosen volume, 0-100.
    volume: u8,
    /// What the engine is actually set to; differs from `volume` during a fade.
    applied_volume: u8,
    /// The last track of a repeat-off run played through.
    at_end: bool,
    /// Bumped on every load; end-of-stream events carry the value they were
    /// registered under.
    generation: u64,
    fade: Option<FadeHandle>,
    next_fade_id: u64,
    crossfade: Duration,
    crossfade_steps: u32,
    equalizer: Equalizer,
}

impl PlaybackSession {
    pub fn new(
        mut engine: Box<dyn AudioEngine>,
        clock: Arc<dyn Clock>,
        events: Sender<ControlEvent>,
        options: SessionOptions,
    ) -> Self {
        let volume = options.volume.min(100);
        engine.set_volume(volume);
        Self {
            engine,
            events,
            playlist: Playlist::default(),
            current: None,
            state: PlaybackState::Stopped,
            seek_return: None,
            position: PositionTracker::new(clock),
            transitions: TransitionController::new(options.repeat, options.shuffle),
            volume,
            applied_volume: volume,
            at_end: false,
            generation: 0,
            fade: None,
            next_fade_id: 0,
            crossfade: options.crossfade,
            crossfade_steps: options.crossfade_steps.max(1),
            equalizer: Equalizer::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.playlist.get(i))
    }

    /// Position to display: the drag target while seeking, the estimate otherwise.
    pub fn position(&self) -> Duration {
        self.position.display()
    }

    pub fn duration(&self) -> Duration {
        self.position.duration()
    }

    pub fn progress(&self) -> Option<f64> {
        self.position.progress()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Volume currently applied to the engine.
    pub fn effective_volume(&self) -> u8 {
        self.applied_volume
    }

    pub fn repeat(&self) -> RepeatMode {
        self.transitions.repeat()
    }

    pub fn shuffle(&self) -> bool {
        self.transitions.shuffle()
    }

    #[cfg(test)]
    pub fn shuffle_order(&self) -> &[usize] {
        self.transitions.order()
    }

    pub fn is_at_end(&self) -> bool {
        self.at_end
    }

    #[cfg(test)]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }

    pub fn crossfade(&self) -> Duration {
        self.crossfade
    }

    /// Replace the playlist, load its first track and optionally start it.
    pub fn set_playlist(&mut self, playlist: Playlist, autoplay: bool) -> Result<()> {
        self.stop();
        self.playlist = playlist;
        self.current = (!self.playlist.is_empty()).then_some(0);
        self.transitions.reset(self.playlist.len(), self.current);
        info!(tracks = self.playlist.len(), "playlist replaced");

        let Some(first) = self.current else {
            self.position.reset(Duration::ZERO);
            return Ok(());
        };
        self.load(first)?;
        if autoplay {
            self.play()?;
        }
        Ok(())
    }

    /// Append tracks not already present. Returns how many were added.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> usize {
        let added = self.playlist.extend_unique(tracks);
        if added > 0 {
            if self.current.is_none() {
                self.current = Some(0);
            }
            self.transitions.reset(self.playlist.len(), self.current);
            info!(added, total = self.playlist.len(), "tracks added");
        }
        added
    }

    /// Load `index` into the engine. Playback does not start.
    ///
    /// Any crossfade in progress is cancelled and the nominal volume restored.
    pub fn load(&mut self, index: usize) -> Result<()> {
        if self.cancel_fade() {
            self.restore_volume();
        }
        self.load_track(index)
    }

    fn load_track(&mut self, index: usize) -> Result<()> {
        let track = self
            .playlist
            .get(index)
            .cloned()
            .ok_or(PlayerError::NoSuchTrack(index))?;

        self.generation += 1;
        self.current = Some(index);
        self.at_end = false;
        self.seek_return = None;
        self.transitions.sync(index);
        self.position.reset(track.duration);

        match self.engine.load(&track.path) {
            Ok(()) => {
                let tx = self.events.clone();
                let generation = self.generation;
                self.engine.on_end_of_stream(Box::new(move || {
                    let _ = tx.send(ControlEvent::TrackEnded { generation });
                }));
                self.state = PlaybackState::Loaded;
                info!(index, track = %track.name, generation, "track loaded");
                Ok(())
            }
            Err(source) => {
                self.state = PlaybackState::Stopped;
                warn!(index, path = %track.path.display(), error = %source, "load failed");
                Err(PlayerError::LoadFailure {
                    path: track.path,
                    source,
                })
            }
        }
    }

    /// Start or resume playback. From `Stopped` this loads the current track
    /// (or the first one) first; after a repeat-off run ended it restarts the
    /// last track from zero.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Fading => return Ok(()),
            PlaybackState::Seeking => {
                if self.seek_return == Some(PlaybackState::Paused) {
                    self.engine.play().map_err(PlayerError::Playback)?;
                    self.position.resume();
                    self.seek_return = Some(PlaybackState::Playing);
                }
                return Ok(());
            }
            PlaybackState::Stopped => {
                let index = match self.current {
                    Some(i) => i,
                    None if !self.playlist.is_empty() => 0,
                    None => return Ok(()),
                };
                self.load_track(index)?;
            }
            PlaybackState::Paused if self.at_end => {
                if let Some(index) = self.current {
                    self.load_track(index)?;
                }
            }
            PlaybackState::Loaded | PlaybackState::Paused => {}
        }

        self.engine.play().map_err(PlayerError::Playback)?;
        self.position.resume();
        self.state = PlaybackState::Playing;
        debug!(index = ?self.current, "playing");
        Ok(())
    }

    /// Pause playback. A running crossfade is cancelled and the volume left
    /// where the fade had it.
    pub fn pause(&mut self) {
        match self.state {
            PlaybackState::Playing | PlaybackState::Fading => {
                self.cancel_fade();
                self.engine.pause();
                self.position.freeze();
                self.state = PlaybackState::Paused;
                debug!("paused");
            }
            PlaybackState::Seeking if self.seek_return == Some(PlaybackState::Playing) => {
                self.engine.pause();
                self.position.freeze();
                self.seek_return = Some(PlaybackState::Paused);
            }
            _ => {}
        }
    }

    pub fn toggle_play(&mut self) -> Result<()> {
        let playing = match self.state {
            PlaybackState::Playing | PlaybackState::Fading => true,
            PlaybackState::Seeking => self.seek_return == Some(PlaybackState::Playing),
            _ => false,
        };
        if playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Stop playback and rewind. The current index is kept.
    pub fn stop(&mut self) {
        self.cancel_fade();
        self.engine.stop();
        self.position.reset(self.position.duration());
        self.state = PlaybackState::Stopped;
        self.seek_return = None;
        self.at_end = false;
    }

    /// Play the next track in play order.
    pub fn next(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };
        let Some(index) = self.transitions.next_index(current) else {
            return Ok(());
        };
        self.load(index)?;
        self.play()
    }

    /// Go to the previous track in play order, resuming playback only if it
    /// was playing.
    pub fn previous(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };
        let was_playing = matches!(self.state, PlaybackState::Playing | PlaybackState::Fading);
        let Some(index) = self.transitions.previous_index(current) else {
            return Ok(());
        };
        self.load(index)?;
        if was_playing {
            self.play()?;
        }
        Ok(())
    }

    /// Load and play a track picked from the playlist.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        self.load(index)?;
        self.play()
    }

    /// Seek to `target`, clamped to the track. Returns `Ok(false)` when the
    /// seek was ignored (nothing loaded, or a crossfade is running).
    pub fn seek_to(&mut self, target: Duration) -> Result<bool> {
        let prior = match self.state {
            PlaybackState::Fading => {
                debug!("seek ignored during crossfade");
                return Ok(false);
            }
            PlaybackState::Stopped => return Ok(false),
            PlaybackState::Seeking => self.seek_return.take().unwrap_or(PlaybackState::Paused),
            other => other,
        };
        self.position.end_drag();

        let target = self.position.clamp(target);
        self.state = PlaybackState::Seeking;
        let result = self.engine.seek(target);
        self.state = prior;

        match result {
            Ok(()) => {
                self.position.anchor(target);
                self.at_end = false;
                debug!(?target, "seeked");
                Ok(true)
            }
            Err(source) => {
                warn!(?target, error = %source, "seek failed");
                Err(PlayerError::SeekFailure { target, source })
            }
        }
    }

    /// Jump `delta_secs` relative to the current position.
    pub fn skip(&mut self, delta_secs: i32) -> Result<bool> {
        if self.state == PlaybackState::Fading {
            return Ok(false);
        }
        let now = self.position.extrapolate().as_secs_f64();
        let target = (now + f64::from(delta_secs)).max(0.0);
        self.seek_to(Duration::from_secs_f64(target))
    }

    /// Start dragging the seek slider. Rejected while stopped or fading.
    pub fn begin_seek_drag(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Loaded => {
                self.seek_return = Some(self.state);
                self.state = PlaybackState::Seeking;
                self.position.begin_drag();
                true
            }
            _ => false,
        }
    }

    pub fn drag_seek(&mut self, target: Duration) {
        if self.state == PlaybackState::Seeking {
            self.position.drag_to(target);
        }
    }

    /// Release the slider and seek to where it was let go.
    pub fn end_seek_drag(&mut self) -> Result<bool> {
        if self.state != PlaybackState::Seeking {
            return Ok(false);
        }
        match self.position.end_drag() {
            Some(target) => self.seek_to(target),
            None => {
                self.state = self.seek_return.take().unwrap_or(PlaybackState::Paused);
                Ok(false)
            }
        }
    }

    /// Apply the end-of-track policy for media loaded under `generation`.
    ///
    /// Stale generations and ends that arrive while a crossfade owns the
    /// transition are ignored.
    pub fn on_track_end(&mut self, generation: u64) -> Result<()> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale end-of-stream ignored");
            return Ok(());
        }
        let playing = match self.state {
            PlaybackState::Playing => true,
            PlaybackState::Seeking => self.seek_return == Some(PlaybackState::Playing),
            _ => false,
        };
        if !playing {
            return Ok(());
        }
        let Some(current) = self.current else {
            return Ok(());
        };

        match self.transitions.on_track_end(current) {
            EndAction::Replay(index) | EndAction::Advance(index) => {
                self.load_track(index)?;
                self.play()
            }
            EndAction::StopAtEnd => {
                self.finish_at_end();
                Ok(())
            }
        }
    }

    /// Park on the last track with the position pinned at its end.
    fn finish_at_end(&mut self) {
        self.engine.pause();
        self.position.end_drag();
        self.position.freeze();
        let duration = self.position.duration();
        if !duration.is_zero() {
            self.position.anchor(duration);
        }
        self.state = PlaybackState::Paused;
        self.seek_return = None;
        self.at_end = true;
        info!(index = ?self.current, "reached end of playlist");
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.apply_volume(self.volume);
    }

    pub fn adjust_volume(&mut self, delta: i16) {
        let v = (i16::from(self.volume) + delta).clamp(0, 100);
        self.set_volume(v as u8);
    }

    /// Put the engine back on the nominal volume, e.g. after a cancelled fade.
    pub fn restore_volume(&mut self) {
        self.apply_volume(self.volume);
    }

    fn apply_volume(&mut self, level: u8) {
        self.engine.set_volume(level);
        self.applied_volume = level;
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.transitions.set_repeat(repeat);
        info!(?repeat, "repeat mode");
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let next = self.transitions.repeat().cycle();
        self.set_repeat(next);
        next
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.transitions.set_shuffle(on, self.current);
        info!(shuffle = on, "shuffle");
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let on = !self.transitions.shuffle();
        self.set_shuffle(on);
        on
    }

    pub fn set_equalizer_band(&mut self, band: usize, gain_db: f32) -> Result<()> {
        let gain = self
            .equalizer
            .set_band(band, gain_db)
            .ok_or(PlayerError::Equalizer(EngineError::Unsupported("equalizer band")))?;
        self.engine
            .set_equalizer_band(band, gain)
            .map_err(PlayerError::Equalizer)
    }

    /// Store the preset's gains and push them to the engine. The gains are
    /// kept even when the engine cannot apply them.
    pub fn apply_equalizer_preset(&mut self, preset: Preset) -> Result<()> {
        self.equalizer.apply_preset(preset);
        let gains = *self.equalizer.gains();
        for (band, gain) in gains.into_iter().enumerate() {
            self.engine
                .set_equalizer_band(band, gain)
                .map_err(PlayerError::Equalizer)?;
        }
        Ok(())
    }

    /// Reconcile the position with the engine clock. Returns whether a
    /// crossfade should start now.
    pub fn poll(&mut self) -> bool {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Fading) {
            if let Some(at) = self.engine.position() {
                self.position.reconcile(at);
            }
        }
        self.crossfade_due()
    }

    /// Let the engine detect end-of-stream.
    pub fn tick_engine(&mut self) {
        self.engine.tick();
    }

    fn crossfade_due(&mut self) -> bool {
        if self.crossfade.is_zero() || self.state != PlaybackState::Playing || self.fade.is_some()
        {
            return false;
        }
        let Some(remaining) = self.position.remaining() else {
            return false;
        };
        let Some(current) = self.current else {
            return false;
        };
        remaining <= self.crossfade && self.transitions.advances_at_end(current)
    }

    /// Hand the transition to a crossfade worker if one is due.
    pub fn start_crossfade(&mut self) -> bool {
        if !self.crossfade_due() {
            return false;
        }
        self.next_fade_id += 1;
        let id = self.next_fade_id;
        let plan = FadePlan::new(self.crossfade, self.crossfade_steps);
        let handle = spawn_fade(id, plan, self.events.clone());
        if handle.failed_to_start() {
            warn!("could not start crossfade worker; track will end without a fade");
            return false;
        }
        info!(fade_id = id, ?plan, "crossfade started");
        self.fade = Some(handle);
        self.state = PlaybackState::Fading;
        true
    }

    /// Apply one step from a crossfade worker. Steps from cancelled or
    /// superseded fades are dropped.
    pub fn apply_fade(&mut self, message: FadeMessage) -> Result<()> {
        let live = self
            .fade
            .as_ref()
            .is_some_and(|f| f.id() == message.fade_id);
        if !live {
            return Ok(());
        }

        match message.step {
            FadeStep::Scale { num, den } => {
                let level = u32::from(self.volume) * num / den.max(1);
                self.apply_volume(level.min(100) as u8);
            }
            FadeStep::Advance => self.advance_during_fade()?,
            FadeStep::Finished => {
                self.fade = None;
                if self.state == PlaybackState::Fading {
                    self.state = PlaybackState::Playing;
                }
                self.restore_volume();
                info!(fade_id = message.fade_id, "crossfade finished");
            }
        }
        Ok(())
    }

    fn advance_during_fade(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            return Ok(());
        };
        match self.transitions.on_track_end(current) {
            EndAction::Replay(index) | EndAction::Advance(index) => {
                if let Err(e) = self.load_track(index) {
                    self.cancel_fade();
                    self.restore_volume();
                    return Err(e);
                }
                if let Err(e) = self.engine.play() {
                    self.cancel_fade();
                    self.restore_volume();
                    return Err(PlayerError::Playback(e));
                }
                self.position.resume();
                self.state = PlaybackState::Fading;
                Ok(())
            }
            EndAction::StopAtEnd => {
                // repeat was switched to off on the last track mid-fade
                self.cancel_fade();
                self.restore_volume();
                self.finish_at_end();
                Ok(())
            }
        }
    }

    /// Route one event from the channel.
    pub fn handle_event(&mut self, event: ControlEvent) -> Result<()> {
        match event {
            ControlEvent::TrackEnded { generation } => self.on_track_end(generation),
            ControlEvent::Fade(message) => self.apply_fade(message),
        }
    }

    /// Cancel a running fade. Returns whether there was one.
    fn cancel_fade(&mut self) -> bool {
        match self.fade.take() {
            Some(fade) => {
                fade.cancel();
                debug!(fade_id = fade.id(), "crossfade cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.cancel_fade();
    }
}
