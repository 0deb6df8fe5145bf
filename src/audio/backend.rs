use std::path::Path;

use super::types::{BackendError, RequestToken};

/// A decoder/renderer that holds exactly one source at a time.
///
/// `prepare_async` must not block: the outcome is reported later as a
/// [`BackendEvent`](super::BackendEvent) carrying the same token, through the
/// channel the backend was constructed with. `Completed` and `Error` events
/// for a running source carry the token it was prepared with as well.
pub trait MediaBackend {
    /// Drop whatever source is loaded, prepared or playing.
    fn reset(&mut self);

    /// Remember `source` as the locator for the next `prepare_async`.
    fn bind_source(&mut self, source: &Path) -> Result<(), BackendError>;

    fn prepare_async(&mut self, token: RequestToken);

    fn start(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn position_ms(&self) -> u64;

    /// Length of the bound source, `0` when unknown.
    fn duration_ms(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Release the backend for good. Called once at teardown.
    fn release(&mut self) {
        self.reset();
    }
}
