//! Utilities for creating `rodio` sinks from files on disk.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::EngineError;

/// Open and decode `path`.
///
/// Built from the `File` itself so the decoder knows the byte length and
/// accepts backward seeks.
pub(super) fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::try_from(file).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Queue `source` on `sink` starting `start_at` into it, paused.
pub(super) fn queue_at<S>(sink: &Sink, source: S, start_at: Duration)
where
    S: Source + Send + 'static,
{
    // `skip_duration` is the fallback seeking primitive; Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, EngineError> {
    let source = open_source(path)?;
    let sink = Sink::connect_new(stream.mixer());
    queue_at(&sink, source, start_at);
    Ok(sink)
}

/// Position within the track for a sink that was queued `base` into it.
///
/// `Sink::get_pos` counts from where the sink started, so a sink rebuilt
/// at an offset needs that offset added back.
pub(super) fn track_position(sink: &Sink, base: Duration) -> Duration {
    base + sink.get_pos()
}
