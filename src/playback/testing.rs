//! Engine double shared by the session and runtime tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::engine::{AudioEngine, EndOfStreamCallback};
use crate::error::EngineError;

#[derive(Default)]
pub(crate) struct FakeState {
    pub loaded: Option<PathBuf>,
    pub loads: Vec<PathBuf>,
    pub playing: bool,
    pub volume: u8,
    pub volumes: Vec<u8>,
    pub position: Option<Duration>,
    pub seeks: Vec<Duration>,
    pub fail_load: Vec<PathBuf>,
    pub fail_seek: bool,
    callback: Option<EndOfStreamCallback>,
}

/// Engine double: records commands and lets the test fire end-of-stream.
#[derive(Clone, Default)]
pub(crate) struct FakeEngine(Arc<Mutex<FakeState>>);

impl FakeEngine {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().unwrap()
    }

    /// Play the loaded media through to its end.
    pub fn finish(&self) {
        let cb = {
            let mut s = self.state();
            s.playing = false;
            s.callback.take()
        };
        if let Some(mut cb) = cb {
            cb();
        }
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        let mut s = self.state();
        s.loads.push(path.to_path_buf());
        s.playing = false;
        s.callback = None;
        if s.fail_load.iter().any(|p| p == path) {
            s.loaded = None;
            s.position = None;
            return Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "bad header".into(),
            });
        }
        s.loaded = Some(path.to_path_buf());
        s.position = Some(Duration::ZERO);
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let mut s = self.state();
        if s.loaded.is_none() {
            return Err(EngineError::NothingLoaded);
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state();
        s.playing = false;
        s.position = s.loaded.as_ref().map(|_| Duration::ZERO);
    }

    fn set_volume(&mut self, volume: u8) {
        let mut s = self.state();
        s.volume = volume;
        s.volumes.push(volume);
    }

    fn position(&self) -> Option<Duration> {
        self.state().position
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        let mut s = self.state();
        if s.fail_seek {
            return Err(EngineError::Seek("not seekable".into()));
        }
        s.seeks.push(position);
        s.position = Some(position);
        Ok(())
    }

    fn on_end_of_stream(&mut self, callback: EndOfStreamCallback) {
        self.state().callback = Some(callback);
    }
}
