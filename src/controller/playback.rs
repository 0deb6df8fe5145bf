use tracing::{debug, error, info, warn};

use crate::audio::{BackendEvent, BackendEventKind, MediaBackend, RequestToken};
use crate::config::PlaybackSettings;
use crate::library::Track;

use super::state::{PlayerState, next_index, prev_index};
use super::surface::StatusSurface;

/// The source currently claimed on the backend.
struct Binding {
    token: RequestToken,
    /// Snapshot of what was bound; survives playlist replacement.
    track: Track,
}

/// Drives one [`MediaBackend`] through load → prepare → play for a playlist.
///
/// No transport call fails: invalid selections are ignored, backend faults
/// are logged and turned into an advance to the next track.
pub struct PlaybackController<B, S> {
    backend: B,
    surface: S,
    playlist: Vec<Track>,
    current: Option<usize>,
    state: PlayerState,
    /// Last token handed out; the next `play` uses its successor.
    last_token: RequestToken,
    binding: Option<Binding>,
    surface_shown: bool,
    /// Failed tracks since the last one that became ready.
    failures: usize,
    error_skip_limit: usize,
    on_state_change: Option<Box<dyn FnMut()>>,
}

impl<B: MediaBackend, S: StatusSurface> PlaybackController<B, S> {
    pub fn new(backend: B, surface: S, settings: &PlaybackSettings) -> Self {
        Self {
            backend,
            surface,
            playlist: Vec::new(),
            current: None,
            state: PlayerState::Idle,
            last_token: RequestToken::default(),
            binding: None,
            surface_shown: false,
            failures: 0,
            error_skip_limit: settings.error_skip_limit,
            on_state_change: None,
        }
    }

    /// Replace the playlist wholesale.
    ///
    /// A bound track keeps playing and the current index is left as is, even
    /// when it no longer fits the new playlist.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        info!(count = tracks.len(), "playlist replaced");
        self.playlist = tracks;
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    /// Bind the track at `index` and start preparing it. Audio starts once
    /// the backend reports ready.
    pub fn play(&mut self, index: usize) {
        if index >= self.playlist.len() {
            debug!(index, len = self.playlist.len(), "ignoring play outside the playlist");
            return;
        }
        self.failures = 0;
        self.load(index);
    }

    pub fn play_next(&mut self) {
        if let Some(index) = next_index(self.current, self.playlist.len()) {
            self.play(index);
        }
    }

    pub fn play_prev(&mut self) {
        if let Some(index) = prev_index(self.current, self.playlist.len()) {
            self.play(index);
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        self.backend.pause();
        self.state = PlayerState::Paused;
        self.surface.set_paused(true);
        self.notify();
    }

    pub fn resume(&mut self) {
        if self.state != PlayerState::Paused {
            return;
        }
        self.backend.start();
        self.state = PlayerState::Playing;
        self.surface.set_paused(false);
        self.notify();
    }

    /// Forward a seek to the backend. Ignored when nothing is bound.
    pub fn seek_to(&mut self, position_ms: u64) {
        if self.binding.is_none() {
            return;
        }
        self.backend.seek_to(position_ms);
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Playback position of the bound track in milliseconds.
    pub fn current_progress(&self) -> u64 {
        if self.binding.is_none() {
            return 0;
        }
        self.backend.position_ms()
    }

    /// Length of the bound track in milliseconds, falling back to the tagged
    /// estimate until the backend knows better.
    pub fn duration(&self) -> u64 {
        let Some(binding) = self.binding.as_ref() else {
            return 0;
        };
        match self.backend.duration_ms() {
            0 => binding.track.duration_ms,
            ms => ms,
        }
    }

    /// The bound track, as it was when bound. `None` when nothing is bound.
    pub fn current_track(&self) -> Option<&Track> {
        self.binding.as_ref().map(|b| &b.track)
    }

    /// Where the bound track sits in the playlist now, if it is still there.
    ///
    /// After a playlist replacement this follows the track's source, not the
    /// stale current index.
    pub fn now_playing_index(&self) -> Option<usize> {
        let bound = &self.binding.as_ref()?.track;
        let at_current = self
            .current
            .filter(|&i| self.playlist.get(i).is_some_and(|t| t.source == bound.source));
        at_current.or_else(|| self.playlist.iter().position(|t| t.source == bound.source))
    }

    /// Register the single state-change observer. A later call replaces it.
    pub fn set_on_state_change<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.on_state_change = Some(Box::new(callback));
    }

    /// Apply a backend notification. Events whose token is not the current
    /// binding's are stale and dropped.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        let current_token = self.binding.as_ref().map(|b| b.token);
        if current_token != Some(event.token) {
            debug!(token = %event.token, kind = ?event.kind, "discarding stale backend event");
            return;
        }

        match event.kind {
            BackendEventKind::Ready => self.on_ready(),
            BackendEventKind::Completed => {
                if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
                    debug!(index = ?self.current, "track finished");
                    self.advance();
                }
            }
            BackendEventKind::Error(e) => {
                warn!(index = ?self.current, token = %event.token, error = %e, "playback failed, skipping");
                if self.record_failure() {
                    self.advance();
                }
            }
        }
    }

    /// Release the backend and take the status surface down.
    pub fn shutdown(&mut self) {
        self.binding = None;
        self.state = PlayerState::Idle;
        self.backend.release();
        if self.surface_shown {
            self.surface.dismiss();
            self.surface_shown = false;
        }
        info!("playback controller shut down");
    }

    fn on_ready(&mut self) {
        if self.state != PlayerState::Loading {
            debug!(state = ?self.state, "ignoring repeated ready");
            return;
        }
        let Some(track) = self.binding.as_ref().map(|b| b.track.clone()) else {
            return;
        };

        self.backend.start();
        self.state = PlayerState::Playing;
        self.failures = 0;

        if self.surface_shown {
            self.surface.update(&track);
        } else {
            self.surface.show(&track);
            self.surface_shown = true;
        }
        info!(index = ?self.current, title = %track.title, artist = %track.artist, "now playing");
        self.notify();
    }

    /// Auto-advance after completion or a fault.
    fn advance(&mut self) {
        if let Some(index) = next_index(self.current, self.playlist.len()) {
            self.load(index);
        } else {
            self.give_up();
        }
    }

    /// Bind `index`, skipping forward over tracks the backend rejects outright.
    fn load(&mut self, mut index: usize) {
        loop {
            self.current = Some(index);
            self.binding = None;
            self.backend.reset();

            let token = self.last_token.next();
            self.last_token = token;

            let track = &self.playlist[index];
            match self.backend.bind_source(&track.source) {
                Ok(()) => {
                    self.binding = Some(Binding {
                        token,
                        track: track.clone(),
                    });
                    self.state = PlayerState::Loading;
                    debug!(index, %token, "preparing");
                    self.backend.prepare_async(token);
                    return;
                }
                Err(e) => {
                    warn!(index, error = %e, "source rejected, skipping");
                    if !self.record_failure() {
                        return;
                    }
                    match next_index(Some(index), self.playlist.len()) {
                        Some(next) => index = next,
                        None => return,
                    }
                }
            }
        }
    }

    /// Count a failed track. Returns `false` once the limit is hit and
    /// playback has been stopped.
    fn record_failure(&mut self) -> bool {
        self.failures += 1;
        let limit = match self.error_skip_limit {
            0 => self.playlist.len().max(1),
            n => n,
        };
        if self.failures >= limit {
            self.give_up();
            return false;
        }
        true
    }

    fn give_up(&mut self) {
        error!(failures = self.failures, "no track could be played, stopping");
        self.binding = None;
        self.backend.reset();
        self.state = PlayerState::Idle;
        if self.surface_shown {
            self.surface.dismiss();
            self.surface_shown = false;
        }
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_state_change.as_mut() {
            callback();
        }
    }
}
