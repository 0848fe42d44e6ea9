//! Music library: folder scanning, duration probing and the playlist model.

mod model;
mod probe;
mod scan;

pub use model::{Playlist, Track};
pub use probe::{DurationProbe, LoftyProbe};
pub use scan::{is_audio_file, scan, scan_files};

#[cfg(test)]
mod tests;
