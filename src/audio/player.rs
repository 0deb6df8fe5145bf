use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AudioSettings;

use super::backend::MediaBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, BackendError, BackendEvent, BackendHandle, BackendInfo, RequestToken};

/// `MediaBackend` backed by a dedicated `rodio` audio thread.
///
/// The handle itself never blocks: every transport call is a message to the
/// audio thread, and queries read the info the thread publishes.
pub struct RodioBackend {
    tx: Sender<AudioCmd>,
    events: Sender<BackendEvent>,
    info: BackendHandle,
    source: Option<PathBuf>,
    /// Token of the last prepare sent since the most recent reset.
    prepared: Option<RequestToken>,
    quit_fade_out: Duration,
    join: Option<JoinHandle<()>>,
}

impl RodioBackend {
    pub fn spawn(events: Sender<BackendEvent>, settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let info: BackendHandle = Arc::new(Mutex::new(BackendInfo::default()));

        let join = spawn_audio_thread(rx, events.clone(), info.clone());

        Self {
            tx,
            events,
            info,
            source: None,
            prepared: None,
            quit_fade_out: Duration::from_millis(settings.quit_fade_out_ms),
            join: Some(join),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone, dropping command");
        }
    }

    /// Report an outcome the audio thread never saw.
    fn emit(&self, event: BackendEvent) {
        if self.events.send(event).is_err() {
            debug!("backend event receiver dropped");
        }
    }

    fn snapshot(&self) -> BackendInfo {
        self.info
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
            .for_token(self.prepared)
    }
}

impl MediaBackend for RodioBackend {
    fn reset(&mut self) {
        self.source = None;
        self.prepared = None;
        if let Ok(mut i) = self.info.lock() {
            *i = BackendInfo::default();
        }
        self.send(AudioCmd::Reset);
    }

    fn bind_source(&mut self, source: &Path) -> Result<(), BackendError> {
        if source.as_os_str().is_empty() || source.is_dir() {
            return Err(BackendError::InvalidSource(source.to_path_buf()));
        }
        self.source = Some(source.to_path_buf());
        Ok(())
    }

    fn prepare_async(&mut self, token: RequestToken) {
        self.prepared = Some(token);
        let Some(path) = self.source.clone() else {
            self.emit(BackendEvent::error(token, BackendError::NoSource));
            return;
        };
        if self.tx.send(AudioCmd::Prepare { token, path }).is_err() {
            warn!(%token, "audio thread is gone, failing prepare");
            self.emit(BackendEvent::error(token, BackendError::Disconnected));
        }
    }

    fn start(&mut self) {
        if let Ok(mut i) = self.info.lock() {
            i.playing = true;
        }
        self.send(AudioCmd::Start);
    }

    fn pause(&mut self) {
        if let Ok(mut i) = self.info.lock() {
            i.playing = false;
        }
        self.send(AudioCmd::Pause);
    }

    fn seek_to(&mut self, position_ms: u64) {
        let pos = Duration::from_millis(position_ms);
        if let Ok(mut i) = self.info.lock() {
            i.position = pos;
        }
        self.send(AudioCmd::SeekTo(pos));
    }

    fn position_ms(&self) -> u64 {
        self.snapshot().position.as_millis() as u64
    }

    fn duration_ms(&self) -> u64 {
        self.snapshot()
            .duration
            .map_or(0, |d| d.as_millis() as u64)
    }

    fn is_playing(&self) -> bool {
        self.snapshot().playing
    }

    /// Fade out, stop the audio thread and wait for it to exit.
    fn release(&mut self) {
        self.source = None;
        self.prepared = None;
        self.send(AudioCmd::Quit {
            fade_out_ms: self.quit_fade_out.as_millis() as u64,
        });
        if let Some(h) = self.join.take() {
            join_audio_thread(h);
        }
    }
}

/// Wait for the audio thread. Returns `false` if it had panicked.
pub(super) fn join_audio_thread(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("audio thread panicked before teardown");
            false
        }
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.release();
        }
    }
}
