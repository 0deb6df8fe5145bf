//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::controller::PlayerState;
use crate::library::{Track, display_from_fields};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected / commit scrub");
    map.insert("space/p", "pause/resume");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("esc", "cancel scrub");
    map.insert("R", "rescan");
    map.insert("q", "quit");
    map
});

const NOW_PLAYING_MARKER: &str = "♪ ";

/// What the controller looks like this frame.
pub struct PlaybackView<'a> {
    pub playlist: &'a [Track],
    pub state: PlayerState,
    /// Index of the bound track, when it is still inside `playlist`.
    pub now_playing: Option<usize>,
    pub current: Option<&'a Track>,
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = ["j/k", "h/l", "H/L", "enter", "esc", "space/p", "gg/G", "R", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a millisecond count as `MM:SS`.
fn format_mmss(ms: u64) -> String {
    let secs = Duration::from_millis(ms).as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_text(app: &App, view: &PlaybackView<'_>, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" {}", view.state.label()));

    if let Some(track) = view.current {
        let song = display_from_fields(track, &ui.track_fields, &ui.track_separator);
        parts.push(format!("Song: {}", song));
    }

    if view.state.is_bound() {
        let shown = app.scrub_position().unwrap_or(app.progress_ms);
        let time = format!("{} / {}", format_mmss(shown), format_mmss(app.duration_ms));
        if app.is_scrubbing() {
            parts.push(format!("Seek to {} (enter/esc)", time));
        } else {
            parts.push(time);
        }
    }

    if app.scanning {
        parts.push("Scanning...".to_string());
    } else {
        parts.push(format!("{} tracks", view.playlist.len()));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir.display()));
    }

    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    view: &PlaybackView<'_>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, view, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let total = view.playlist.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = view.playlist[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let label =
                    display_from_fields(track, &ui_settings.track_fields, &ui_settings.track_separator);
                if view.now_playing == Some(start + offset) {
                    ListItem::new(format!("{NOW_PLAYING_MARKER}{label}")).bold()
                } else {
                    ListItem::new(format!("  {label}"))
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let shown = app.scrub_position().unwrap_or(app.progress_ms);
    let ratio = if app.duration_ms > 0 {
        (shown as f64 / app.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(ratio)
        .label(format!("{} / {}", format_mmss(shown), format_mmss(app.duration_ms)));
    frame.render_widget(gauge, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
