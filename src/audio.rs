//! Audio output through `rodio`.
//!
//! [`RodioEngine`] implements the playback session's engine trait on top of a
//! single `Sink` per loaded track.

mod engine;
mod sink;

pub use engine::RodioEngine;
