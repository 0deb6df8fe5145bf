//! Audio-related small types and handles.
//!
//! This module defines the request token used to tell bindings apart, the
//! events the backend reports back to the controller, the commands sent to
//! the audio thread and the shared info handle it publishes.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Identifies one `play` request. Every new binding gets a strictly larger token.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The token that follows `self`.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failures reported by a media backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid source locator {0:?}")]
    InvalidSource(PathBuf),

    #[error("prepare requested without a bound source")]
    NoSource,

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("no audio output device available")]
    OutputUnavailable,

    #[error("audio thread is not running")]
    Disconnected,
}

#[derive(Debug)]
pub enum BackendEventKind {
    /// The prepared source can start.
    Ready,
    /// The started source played to its end.
    Completed,
    /// Binding, preparing or rendering the source failed.
    Error(BackendError),
}

/// A notification from the backend, stamped with the token of the request it belongs to.
#[derive(Debug)]
pub struct BackendEvent {
    pub token: RequestToken,
    pub kind: BackendEventKind,
}

impl BackendEvent {
    pub fn ready(token: RequestToken) -> Self {
        Self {
            token,
            kind: BackendEventKind::Ready,
        }
    }

    pub fn completed(token: RequestToken) -> Self {
        Self {
            token,
            kind: BackendEventKind::Completed,
        }
    }

    pub fn error(token: RequestToken, error: BackendError) -> Self {
        Self {
            token,
            kind: BackendEventKind::Error(error),
        }
    }
}

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Open and decode `path` into a paused sink, then report `Ready` or `Error`.
    Prepare { token: RequestToken, path: PathBuf },
    /// Start (or continue) the prepared sink.
    Start,
    /// Pause the current sink.
    Pause,
    /// Move the current sink to an absolute position.
    SeekTo(Duration),
    /// Drop the current sink.
    Reset,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Runtime backend information shared with the controlling thread.
#[derive(Debug, Clone, Default)]
pub struct BackendInfo {
    /// Token of the sink currently held by the audio thread.
    pub token: Option<RequestToken>,
    /// Playback position inside the current source.
    pub position: Duration,
    /// Total length reported by the decoder, when it knows it.
    pub duration: Option<Duration>,
    /// Whether the sink is currently producing audio.
    pub playing: bool,
}

impl BackendInfo {
    /// This info if it describes the sink prepared for `token`, otherwise the
    /// idle defaults. Filters out ticks a superseded sink published late.
    pub fn for_token(self, token: Option<RequestToken>) -> Self {
        if self.token.is_some() && self.token == token {
            self
        } else {
            Self::default()
        }
    }
}

pub type BackendHandle = Arc<Mutex<BackendInfo>>;
