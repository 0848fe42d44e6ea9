use std::path::Path;
use std::time::Duration;

use crate::error::EngineError;

/// Invoked once when the loaded media plays through to its end.
pub type EndOfStreamCallback = Box<dyn FnMut() + Send>;

/// The media engine the playback session drives.
///
/// Decode, output and mixing all live behind this trait; the session only
/// issues commands and reads the clock.
pub trait AudioEngine {
    /// Open `path`, replacing whatever was loaded. Playback does not start.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Start or resume playback of the loaded media.
    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn stop(&mut self);

    /// Output level, 0-100.
    fn set_volume(&mut self, volume: u8);

    /// Current position, `None` when nothing is loaded.
    fn position(&self) -> Option<Duration>;

    fn seek(&mut self, position: Duration) -> Result<(), EngineError>;

    /// Register the end-of-stream notification for the currently loaded media.
    /// A later registration replaces an earlier one.
    fn on_end_of_stream(&mut self, callback: EndOfStreamCallback);

    /// Let engines without an event thread detect end-of-stream and fire the
    /// registered callback. Called periodically from the driver loop.
    fn tick(&mut self) {}

    /// Set one equalizer band (0-9) in dB.
    fn set_equalizer_band(&mut self, _band: usize, _gain_db: f32) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("equalizer"))
    }
}
