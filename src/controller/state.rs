//! Controller state and playlist navigation arithmetic.

/// Where the controller is in the load/prepare/play protocol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing bound to the backend.
    #[default]
    Idle,
    /// A source is bound and preparing; audio has not started.
    Loading,
    Playing,
    Paused,
}

impl PlayerState {
    /// Whether a source is bound in this state.
    pub fn is_bound(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Stopped",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
        }
    }
}

/// Index after `current` in a playlist of `len`, wrapping to the start.
///
/// With nothing selected this is the first track.
pub(crate) fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) => (i + 1) % len,
        None => 0,
    })
}

/// Index before `current` in a playlist of `len`, wrapping to the end.
///
/// With nothing selected this is the last track.
pub(crate) fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(0) | None => len - 1,
        // A stale index from a longer playlist still lands inside this one.
        Some(i) => (i - 1) % len,
    })
}
