//! Application model types: `App` and `ProgressPoller`.
//!
//! The `App` struct holds what the TUI needs between frames: the list cursor,
//! the last polled progress, a pending scrub position and the status line.
//! Playback itself is owned by the controller.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Drives the periodic progress read. Suppressed while the user scrubs.
#[derive(Debug, Clone)]
pub struct ProgressPoller {
    period: Duration,
    last: Option<Instant>,
}

impl ProgressPoller {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Whether a poll should run at `now`.
    pub fn due(&self, now: Instant, scrubbing: bool) -> bool {
        if scrubbing {
            return false;
        }
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.period,
            None => true,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Force the next `due` check to fire.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// The main application model.
pub struct App {
    /// Cursor into the playlist.
    pub selected: usize,
    /// Last position read from the controller (milliseconds).
    pub progress_ms: u64,
    /// Last duration read from the controller (milliseconds).
    pub duration_ms: u64,
    pub poller: ProgressPoller,
    /// Pending seek position while the user scrubs.
    scrub: Option<u64>,
    scrub_step_ms: u64,
    pub status: Option<String>,
    pub current_dir: Option<PathBuf>,
    pub scanning: bool,
    /// Set by the controller's state-change observer.
    dirty: Rc<Cell<bool>>,
}

impl App {
    pub fn new(poll_period: Duration, scrub_seconds: u64) -> Self {
        Self {
            selected: 0,
            progress_ms: 0,
            duration_ms: 0,
            poller: ProgressPoller::new(poll_period),
            scrub: None,
            scrub_step_ms: scrub_seconds.saturating_mul(1000),
            status: None,
            current_dir: None,
            scanning: false,
            dirty: Rc::new(Cell::new(true)),
        }
    }

    /// A flag the controller observer can raise to ask for a refresh.
    pub fn dirty_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.dirty)
    }

    /// Consume a pending refresh request.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = Some(dir);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = match self.selected {
            0 => len - 1,
            i => (i - 1).min(len - 1),
        };
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside a playlist of `len` after a rescan.
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    pub fn scrub_position(&self) -> Option<u64> {
        self.scrub
    }

    /// Start scrubbing from the last polled position, or move the pending
    /// position, by `steps` scrub steps. Clamped to `[0, duration]`.
    pub fn scrub_by(&mut self, steps: i64) {
        let from = self.scrub.unwrap_or(self.progress_ms);
        let delta = self.scrub_step_ms.saturating_mul(steps.unsigned_abs());
        let moved = if steps < 0 {
            from.saturating_sub(delta)
        } else {
            from.saturating_add(delta)
        };
        let moved = if self.duration_ms > 0 {
            moved.min(self.duration_ms)
        } else {
            moved
        };
        self.scrub = Some(moved);
    }

    /// Finish scrubbing and hand back the position to seek to. Polling
    /// resumes on the next tick.
    pub fn commit_scrub(&mut self) -> Option<u64> {
        let pos = self.scrub.take()?;
        self.progress_ms = pos;
        self.poller.reset();
        Some(pos)
    }

    pub fn cancel_scrub(&mut self) {
        if self.scrub.take().is_some() {
            self.poller.reset();
        }
    }

    /// Record a progress reading taken at `now`.
    pub fn apply_progress(&mut self, now: Instant, progress_ms: u64, duration_ms: u64) {
        self.progress_ms = progress_ms;
        self.duration_ms = duration_ms;
        self.poller.mark(now);
    }

    /// Drop progress and any scrub in flight; used when playback stops.
    pub fn clear_progress(&mut self) {
        self.progress_ms = 0;
        self.duration_ms = 0;
        self.scrub = None;
    }
}
