//! Application module: the view state the TUI renders besides the session.
//!
//! The `App` model lives in `app::model` and holds the playlist cursor,
//! status line and display toggles.

mod model;

pub use model::*;
