use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::{EngineError, PlayerError};
use crate::playback::{AudioEngine, EndOfStreamCallback};

use super::sink::{create_sink_at, track_position};

/// Engine backed by the default output device.
///
/// `OutputStream` is not `Send`, so the engine lives on the driver thread and
/// end-of-stream is detected by polling the sink from [`AudioEngine::tick`].
pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    /// Where in the track the current sink started.
    base: Duration,
    volume: f32,
    playing: bool,
    on_end: Option<EndOfStreamCallback>,
}

impl RodioEngine {
    pub fn open() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::OutputUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            path: None,
            base: Duration::ZERO,
            volume: 0.7,
            playing: false,
            on_end: None,
        })
    }

    fn sink(&self) -> Result<&Sink, EngineError> {
        self.sink.as_ref().ok_or(EngineError::NothingLoaded)
    }

    /// Rebuild the sink at `position` for decoders that cannot seek in place.
    fn reopen_at(&mut self, position: Duration) -> Result<(), EngineError> {
        let path = self.path.clone().ok_or(EngineError::NothingLoaded)?;
        let sink = create_sink_at(&self.stream, &path, position)?;
        sink.set_volume(self.volume);
        if self.playing {
            sink.play();
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.base = position;
        Ok(())
    }
}

impl AudioEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.playing = false;
        self.on_end = None;
        self.path = None;
        self.base = Duration::ZERO;

        let sink = create_sink_at(&self.stream, path, Duration::ZERO)?;
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        self.path = Some(path.to_path_buf());
        debug!(path = %path.display(), "sink ready");
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.sink()?.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.playing = false;
        self.on_end = None;
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = f32::from(volume.min(100)) / 100.0;
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn position(&self) -> Option<Duration> {
        self.sink
            .as_ref()
            .map(|sink| track_position(sink, self.base))
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        let in_place = self.sink()?.try_seek(position);
        match in_place {
            Ok(()) => {
                // an in-place seek moves the sink's own clock to `position`
                self.base = Duration::ZERO;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "in-place seek unsupported, reopening");
                self.reopen_at(position).map_err(|reopen| {
                    warn!(error = %reopen, "seek by reopening failed");
                    EngineError::Seek(e.to_string())
                })
            }
        }
    }

    fn on_end_of_stream(&mut self, callback: EndOfStreamCallback) {
        self.on_end = Some(callback);
    }

    fn tick(&mut self) {
        let ended = self.playing && self.sink.as_ref().is_some_and(Sink::empty);
        if ended {
            self.playing = false;
            if let Some(mut cb) = self.on_end.take() {
                cb();
            }
        }
    }
}
