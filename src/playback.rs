//! Playback core: the session state machine and the pieces it is built from.
//!
//! - [`PositionTracker`]: smooth position between coarse engine polls
//! - [`TransitionController`]: repeat/shuffle and end-of-track policy
//! - [`PlaybackSession`]: transport state machine owning the engine
//! - crossfade worker: fade-out, swap, fade-in on its own thread

mod clock;
mod crossfade;
mod engine;
mod equalizer;
mod events;
mod position;
mod session;
mod transition;

pub use clock::{Clock, SystemClock};
pub use crossfade::{FadeMessage, FadePlan, FadeStep};
pub use engine::{AudioEngine, EndOfStreamCallback};
pub use equalizer::{BAND_LABELS, BANDS, Equalizer, Preset};
pub use events::ControlEvent;
pub use position::PositionTracker;
pub use session::{PlaybackSession, PlaybackState, SessionOptions};
pub use transition::{EndAction, RepeatMode, TransitionController};

#[cfg(test)]
pub(crate) mod testing;
