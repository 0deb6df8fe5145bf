use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{BackendEvent, RodioBackend};
use crate::controller::PlaybackController;
use crate::error::Error;
use crate::library::ScanResult;
use crate::mpris::{self, ControlCmd};

mod event_loop;
mod logging;
mod settings;

/// Command-line arguments for encore.
#[derive(Parser, Debug)]
#[command(name = "encore")]
#[command(about = "Terminal music player for a local directory")]
#[command(version)]
struct Args {
    /// Music directory to scan (defaults to the current directory).
    dir: Option<PathBuf>,

    /// Write logs to this file; without it logs are discarded.
    #[arg(long, env = "ENCORE_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Read settings from this file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective settings as TOML and exit.
    #[arg(long)]
    dump_config: bool,
}

pub fn run() -> Result<(), Error> {
    let args = Args::parse();
    let (settings, config_fallback) = settings::load_settings(args.config.as_deref())?;

    if args.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    logging::init(args.log_file.as_deref().or(settings.logging.file.as_deref()))?;
    if let Some(reason) = config_fallback {
        warn!(%reason, "config not applied");
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    info!(dir = %dir.display(), "starting encore");

    let (event_tx, event_rx) = mpsc::channel::<BackendEvent>();
    let backend = RodioBackend::spawn(event_tx, &settings.audio);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let surface = mpris::spawn_mpris(control_tx);

    let mut controller = PlaybackController::new(backend, surface, &settings.playback);
    let mut app = App::new(
        Duration::from_millis(settings.ui.progress_poll_ms),
        settings.controls.scrub_seconds,
    );
    let dirty = app.dirty_flag();
    controller.set_on_state_change(move || dirty.set(true));

    let (scan_tx, scan_rx) = mpsc::channel::<ScanResult>();
    let channels = event_loop::Channels {
        backend_events: event_rx,
        controls: control_rx,
        scans: scan_rx,
        scan_tx,
    };
    event_loop::start_scan(&mut app, &settings, &channels, dir);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &channels,
        &mut state,
    );

    controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("encore exited");
    run_result
}
