use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::App;
use crate::audio::{BackendEvent, MediaBackend, RodioBackend};
use crate::config;
use crate::controller::{PlaybackController, PlayerState, StatusSurface};
use crate::error::Error;
use crate::library::{ScanResult, spawn_scan};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::ui::{self, PlaybackView};

pub type Controller = PlaybackController<RodioBackend, MprisHandle>;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Receivers drained into the controller between key presses.
pub struct Channels {
    pub backend_events: Receiver<BackendEvent>,
    pub controls: Receiver<ControlCmd>,
    pub scans: Receiver<ScanResult>,
    /// Kept so rescans can post to the same receiver.
    pub scan_tx: Sender<ScanResult>,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
    channels: &Channels,
    state: &mut EventLoopState,
) -> Result<(), Error> {
    loop {
        while let Ok(event) = channels.backend_events.try_recv() {
            controller.handle_backend_event(event);
        }

        while let Ok(result) = channels.scans.try_recv() {
            apply_scan(app, controller, result);
        }

        while let Ok(cmd) = channels.controls.try_recv() {
            if apply_control(cmd, app, controller) {
                return Ok(());
            }
        }

        refresh_progress(app, controller, Instant::now());

        let view = PlaybackView {
            playlist: controller.playlist(),
            state: controller.state(),
            now_playing: controller.now_playing_index(),
            current: controller.current_track(),
        };
        terminal.draw(|f| ui::draw(f, app, &view, &settings.ui, &settings.controls))?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, channels, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Read progress if a poll is due or the controller reported a change.
fn refresh_progress<B: MediaBackend>(
    app: &mut App,
    controller: &PlaybackController<B, MprisHandle>,
    now: Instant,
) {
    if app.take_dirty() {
        if controller.state().is_bound() {
            app.poller.reset();
        } else {
            app.clear_progress();
        }
    }

    if !controller.state().is_bound() || !app.poller.due(now, app.is_scrubbing()) {
        return;
    }
    app.apply_progress(now, controller.current_progress(), controller.duration());
    controller.surface().set_position_ms(app.progress_ms);
}

fn apply_scan<B: MediaBackend, S: StatusSurface>(
    app: &mut App,
    controller: &mut PlaybackController<B, S>,
    result: ScanResult,
) {
    app.scanning = false;
    let count = result.tracks.len();
    controller.set_playlist(result.tracks);
    app.clamp_selection(count);
    if count == 0 {
        app.set_status(format!("No audio files in {}", result.dir.display()));
    } else {
        app.status = None;
    }
}

fn rescan(app: &mut App, settings: &config::Settings, channels: &Channels) {
    if app.scanning {
        return;
    }
    let Some(dir) = app.current_dir.clone() else {
        return;
    };
    info!(dir = %dir.display(), "rescanning library");
    app.scanning = true;
    spawn_scan(dir, settings.library.clone(), channels.scan_tx.clone());
}

fn toggle_pause<B: MediaBackend, S: StatusSurface>(
    app: &App,
    controller: &mut PlaybackController<B, S>,
) {
    if controller.is_playing() {
        controller.pause();
        return;
    }
    match controller.state() {
        PlayerState::Paused => controller.resume(),
        PlayerState::Idle => controller.play(app.selected),
        PlayerState::Loading | PlayerState::Playing => {}
    }
}

/// Position to seek to for a relative MPRIS seek, clamped to the track.
fn seek_target(position_ms: u64, offset_micros: i64, duration_ms: u64) -> u64 {
    let target = (position_ms as i64).saturating_add(offset_micros / 1000).max(0) as u64;
    if duration_ms > 0 {
        target.min(duration_ms)
    } else {
        target
    }
}

/// Apply a request from the session bus. Returns `true` when the app should quit.
fn apply_control<B: MediaBackend, S: StatusSurface>(
    cmd: ControlCmd,
    app: &mut App,
    controller: &mut PlaybackController<B, S>,
) -> bool {
    debug!(?cmd, "mpris control");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match controller.state() {
            PlayerState::Paused => controller.resume(),
            PlayerState::Idle => controller.play(app.selected),
            PlayerState::Loading | PlayerState::Playing => {}
        },
        // There is no stop-to-idle transport; stopping holds the track paused.
        ControlCmd::Pause | ControlCmd::Stop => controller.pause(),
        ControlCmd::PlayPause => toggle_pause(app, controller),
        ControlCmd::Next => {
            app.cancel_scrub();
            controller.play_next();
        }
        ControlCmd::Prev => {
            app.cancel_scrub();
            controller.play_prev();
        }
        ControlCmd::Seek(offset) => {
            let target = seek_target(controller.current_progress(), offset, controller.duration());
            controller.seek_to(target);
            app.poller.reset();
        }
        ControlCmd::SetPosition(position) => {
            if position >= 0 {
                controller.seek_to(position as u64 / 1000);
                app.poller.reset();
            }
        }
    }
    false
}

/// Returns `true` when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller,
    channels: &Channels,
    state: &mut EventLoopState,
) -> bool {
    let len = controller.playlist().len();
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(len),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.last(len),
        KeyCode::Enter => match app.commit_scrub() {
            Some(pos) => controller.seek_to(pos),
            None => controller.play(app.selected),
        },
        KeyCode::Esc => app.cancel_scrub(),
        KeyCode::Char('p') | KeyCode::Char(' ') => toggle_pause(app, controller),
        KeyCode::Char('l') => {
            app.cancel_scrub();
            controller.play_next();
        }
        KeyCode::Char('h') => {
            app.cancel_scrub();
            controller.play_prev();
        }
        KeyCode::Char('L') => {
            if controller.state().is_bound() {
                app.scrub_by(1);
            }
        }
        KeyCode::Char('H') => {
            if controller.state().is_bound() {
                app.scrub_by(-1);
            }
        }
        KeyCode::Char('R') => rescan(app, settings, channels),
        _ => {}
    }

    false
}

/// Kick off the first scan of `dir`.
pub fn start_scan(app: &mut App, settings: &config::Settings, channels: &Channels, dir: PathBuf) {
    app.set_current_dir(dir);
    rescan(app, settings, channels);
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use super::*;
    use crate::audio::{BackendError, RequestToken};
    use crate::config::PlaybackSettings;
    use crate::library::Track;

    /// Backend that records seeks and remembers the last prepared token.
    #[derive(Clone, Default)]
    struct RecordingBackend {
        seeks: Rc<RefCell<Vec<u64>>>,
        prepared: Rc<Cell<RequestToken>>,
    }

    impl MediaBackend for RecordingBackend {
        fn reset(&mut self) {}

        fn bind_source(&mut self, _source: &Path) -> Result<(), BackendError> {
            Ok(())
        }

        fn prepare_async(&mut self, token: RequestToken) {
            self.prepared.set(token);
        }

        fn start(&mut self) {}

        fn pause(&mut self) {}

        fn seek_to(&mut self, position_ms: u64) {
            self.seeks.borrow_mut().push(position_ms);
        }

        fn position_ms(&self) -> u64 {
            0
        }

        fn duration_ms(&self) -> u64 {
            0
        }

        fn is_playing(&self) -> bool {
            false
        }
    }

    struct NullSurface;

    impl StatusSurface for NullSurface {
        fn show(&mut self, _track: &Track) {}
        fn update(&mut self, _track: &Track) {}
        fn set_paused(&mut self, _paused: bool) {}
        fn dismiss(&mut self) {}
    }

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: None,
            source: PathBuf::from(format!("/music/{title}.flac")),
            duration_ms: 60_000,
            art: None,
        }
    }

    fn setup(
        titles: &[&str],
    ) -> (
        App,
        PlaybackController<RecordingBackend, NullSurface>,
        RecordingBackend,
    ) {
        let backend = RecordingBackend::default();
        let mut controller =
            PlaybackController::new(backend.clone(), NullSurface, &PlaybackSettings::default());
        controller.set_playlist(titles.iter().map(|t| track(t)).collect());
        (App::new(Duration::from_millis(1000), 5), controller, backend)
    }

    fn make_ready(
        controller: &mut PlaybackController<RecordingBackend, NullSurface>,
        backend: &RecordingBackend,
    ) {
        controller.handle_backend_event(BackendEvent::ready(backend.prepared.get()));
    }

    #[test]
    fn stop_pauses_and_keeps_the_track_bound() {
        let (mut app, mut controller, backend) = setup(&["A", "B"]);
        controller.play(0);
        make_ready(&mut controller, &backend);

        assert!(!apply_control(ControlCmd::Stop, &mut app, &mut controller));
        assert_eq!(controller.state(), PlayerState::Paused);
        assert_eq!(controller.current_track().map(|t| t.title.as_str()), Some("A"));
    }

    #[test]
    fn play_from_idle_starts_the_selected_track() {
        let (mut app, mut controller, _backend) = setup(&["A", "B", "C"]);
        app.selected = 2;

        apply_control(ControlCmd::Play, &mut app, &mut controller);
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(controller.current_index(), Some(2));
    }

    #[test]
    fn play_pause_toggles_a_playing_track() {
        let (mut app, mut controller, backend) = setup(&["A"]);
        controller.play(0);
        make_ready(&mut controller, &backend);

        apply_control(ControlCmd::PlayPause, &mut app, &mut controller);
        assert_eq!(controller.state(), PlayerState::Paused);
        apply_control(ControlCmd::PlayPause, &mut app, &mut controller);
        assert_eq!(controller.state(), PlayerState::Playing);
    }

    #[test]
    fn negative_set_position_is_ignored() {
        let (mut app, mut controller, backend) = setup(&["A"]);
        controller.play(0);
        make_ready(&mut controller, &backend);

        apply_control(ControlCmd::SetPosition(-1), &mut app, &mut controller);
        assert!(backend.seeks.borrow().is_empty());

        apply_control(ControlCmd::SetPosition(12_000_000), &mut app, &mut controller);
        assert_eq!(*backend.seeks.borrow(), vec![12_000]);
    }

    #[test]
    fn quit_asks_the_loop_to_stop() {
        let (mut app, mut controller, _backend) = setup(&["A"]);
        assert!(apply_control(ControlCmd::Quit, &mut app, &mut controller));
    }

    #[test]
    fn scan_result_replaces_playlist_and_clamps_selection() {
        let (mut app, mut controller, _backend) = setup(&[]);
        app.selected = 7;
        app.scanning = true;
        app.set_status("stale");

        apply_scan(
            &mut app,
            &mut controller,
            ScanResult {
                dir: PathBuf::from("/music"),
                tracks: vec![track("A"), track("B")],
            },
        );
        assert!(!app.scanning);
        assert_eq!(app.selected, 1);
        assert_eq!(app.status, None);
        assert_eq!(controller.playlist().len(), 2);
    }

    #[test]
    fn empty_scan_reports_the_directory() {
        let (mut app, mut controller, _backend) = setup(&["A"]);
        app.selected = 0;

        apply_scan(
            &mut app,
            &mut controller,
            ScanResult {
                dir: PathBuf::from("/music/empty"),
                tracks: Vec::new(),
            },
        );
        assert_eq!(app.selected, 0);
        assert!(controller.playlist().is_empty());
        assert_eq!(app.status.as_deref(), Some("No audio files in /music/empty"));
    }

    #[test]
    fn seek_target_clamps_to_track_bounds() {
        assert_eq!(seek_target(10_000, 5_000_000, 60_000), 15_000);
        assert_eq!(seek_target(10_000, -20_000_000, 60_000), 0);
        assert_eq!(seek_target(58_000, 5_000_000, 60_000), 60_000);
        assert_eq!(seek_target(58_000, 5_000_000, 0), 63_000);
    }
}
