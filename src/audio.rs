//! Media backend: decoding and output for exactly one bound source.
//!
//! The controller talks to audio output only through [`MediaBackend`]. The
//! production implementation, [`RodioBackend`], runs `rodio` on its own
//! thread and reports prepare/completion/error outcomes as [`BackendEvent`]s.

mod backend;
mod player;
mod sink;
mod thread;
mod types;

pub use backend::MediaBackend;
pub use player::RodioBackend;
pub use types::*;
