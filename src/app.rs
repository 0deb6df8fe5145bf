//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the cursor, the polled
//! progress and the scrub state.

mod model;

pub use model::*;
