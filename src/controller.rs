//! Playback controller: the single owner of the playlist, the current index
//! and the one live binding to the media backend.
//!
//! Transport calls and backend events must be applied from the same thread;
//! the runtime event loop drains the backend's channel into
//! [`PlaybackController::handle_backend_event`] between user inputs.

mod playback;
mod state;
mod surface;

pub use playback::PlaybackController;
pub use state::PlayerState;
pub use surface::StatusSurface;
