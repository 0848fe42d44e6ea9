//! Duration probing through `lofty`.

use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;

/// Something that can tell how long an audio file is.
pub trait DurationProbe {
    /// Length of the file at `path`, or `None` when it cannot be determined.
    fn probe(&self, path: &Path) -> Option<Duration>;
}

/// Reads the container/codec properties with `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, path: &Path) -> Option<Duration> {
        let tagged = lofty::read_from_path(path).ok()?;
        let duration = tagged.properties().duration();
        (!duration.is_zero()).then_some(duration)
    }
}
