use super::crossfade::FadeMessage;

/// Everything that reaches the session from outside the driver thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The engine finished the media loaded under `generation`.
    TrackEnded { generation: u64 },
    /// A step from a crossfade worker.
    Fade(FadeMessage),
}
