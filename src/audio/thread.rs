use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::sink::{create_sink_at, fade_out_sink};
use super::types::{AudioCmd, BackendError, BackendEvent, BackendHandle, BackendInfo, RequestToken};

/// How often the thread samples the sink for position and end-of-track.
const TICK: Duration = Duration::from_millis(200);

/// The sink currently owned by the audio thread.
struct Loaded {
    token: RequestToken,
    path: PathBuf,
    sink: Sink,
    /// Position the sink was rebuilt at; `Sink::get_pos` counts from here.
    offset: Duration,
    started: bool,
    finished: bool,
}

impl Loaded {
    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<BackendEvent>,
    info: BackendHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
                // but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device; every track will fail to prepare");
                None
            }
        };

        let mut current: Option<Loaded> = None;

        let emit = |event: BackendEvent| {
            if events.send(event).is_err() {
                debug!("backend event receiver dropped");
            }
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCmd::Prepare { token, path } => {
                        drop_current(&mut current, &info);

                        let Some(stream) = stream.as_ref() else {
                            emit(BackendEvent::error(token, BackendError::OutputUnavailable));
                            continue;
                        };

                        match create_sink_at(stream, &path, Duration::ZERO) {
                            Ok((sink, total)) => {
                                debug!(%token, path = %path.display(), "source prepared");
                                if let Ok(mut i) = info.lock() {
                                    *i = BackendInfo {
                                        token: Some(token),
                                        position: Duration::ZERO,
                                        duration: total,
                                        playing: false,
                                    };
                                }
                                current = Some(Loaded {
                                    token,
                                    path,
                                    sink,
                                    offset: Duration::ZERO,
                                    started: false,
                                    finished: false,
                                });
                                emit(BackendEvent::ready(token));
                            }
                            Err(e) => emit(BackendEvent::error(token, e)),
                        }
                    }

                    AudioCmd::Start => {
                        if let Some(ref mut loaded) = current {
                            loaded.sink.play();
                            loaded.started = true;
                            if let Ok(mut i) = info.lock() {
                                i.playing = true;
                            }
                        }
                    }

                    AudioCmd::Pause => {
                        if let Some(ref loaded) = current {
                            loaded.sink.pause();
                            if let Ok(mut i) = info.lock() {
                                i.playing = false;
                                i.position = loaded.position();
                            }
                        }
                    }

                    AudioCmd::SeekTo(pos) => {
                        let (Some(stream), Some(loaded)) = (stream.as_ref(), current.as_mut())
                        else {
                            continue;
                        };
                        seek_loaded(stream, loaded, pos);
                        if let Ok(mut i) = info.lock() {
                            i.position = loaded.position();
                        }
                    }

                    AudioCmd::Reset => drop_current(&mut current, &info),

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(loaded) = current.take() {
                            fade_out_sink(&loaded.sink, fade_out_ms);
                            loaded.sink.stop();
                        }
                        // Update shared state so UI/MPRIS don't keep showing Playing.
                        if let Ok(mut i) = info.lock() {
                            *i = BackendInfo::default();
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    let Some(ref mut loaded) = current else {
                        continue;
                    };
                    if let Ok(mut i) = info.lock() {
                        i.position = loaded.position();
                    }
                    // periodic check for end of track
                    if loaded.started
                        && !loaded.finished
                        && !loaded.sink.is_paused()
                        && loaded.sink.empty()
                    {
                        loaded.finished = true;
                        if let Ok(mut i) = info.lock() {
                            i.playing = false;
                        }
                        emit(BackendEvent::completed(loaded.token));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn drop_current(current: &mut Option<Loaded>, info: &BackendHandle) {
    if let Some(loaded) = current.take() {
        loaded.sink.stop();
    }
    if let Ok(mut i) = info.lock() {
        *i = BackendInfo::default();
    }
}

/// Seek in place when the decoder supports it, otherwise rebuild the sink
/// and skip into the file.
fn seek_loaded(stream: &OutputStream, loaded: &mut Loaded, pos: Duration) {
    loaded.finished = false;

    match loaded.sink.try_seek(pos) {
        Ok(()) => {
            loaded.offset = Duration::ZERO;
        }
        Err(e) => {
            debug!(error = %e, "in-place seek unsupported, rebuilding sink");
            match create_sink_at(stream, &loaded.path, pos) {
                Ok((sink, _)) => {
                    let paused = loaded.sink.is_paused();
                    loaded.sink.stop();
                    if !paused {
                        sink.play();
                    }
                    loaded.sink = sink;
                    loaded.offset = pos;
                }
                Err(e) => warn!(error = %e, "seek failed"),
            }
        }
    }
}
