use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{ArtKey, Track};

/// Artist strings some taggers write instead of leaving the field empty.
const PLACEHOLDER_ARTISTS: [&str; 2] = ["<unknown>", "unknown"];

/// Outcome of one background scan.
#[derive(Debug)]
pub struct ScanResult {
    pub dir: PathBuf,
    pub tracks: Vec<Track>,
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn normalize_artist(raw: Option<&str>, settings: &LibrarySettings) -> String {
    match raw.map(str::trim) {
        Some(a) if !a.is_empty() && !PLACEHOLDER_ARTISTS.contains(&a.to_lowercase().as_str()) => {
            a.to_string()
        }
        _ => settings.unknown_artist.clone(),
    }
}

fn read_track(path: &Path, settings: &LibrarySettings) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist: Option<String> = None;
    let mut album: Option<String> = None;
    let mut duration_ms: u64 = 0;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration_ms = tagged.properties().duration().as_millis() as u64;

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    title = v.trim().to_string();
                }
            }
            artist = tag.artist().map(|v| v.to_string());
            album = tag
                .album()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
    }

    let artist = normalize_artist(artist.as_deref(), settings);
    let art = album.as_deref().map(|a| ArtKey::for_album(&artist, a));

    Track {
        title,
        artist,
        album,
        source: path.to_path_buf(),
        duration_ms,
        art,
    }
}

/// Walk `dir` and build the playlist, ordered by artist, album, then title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let started = Instant::now();
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let track = read_track(path, settings);
        // A zero duration means the tags could not tell; keep those.
        if track.duration_ms > 0 && track.duration_ms < settings.min_duration_ms {
            debug!(path = %path.display(), duration_ms = track.duration_ms, "skipping short clip");
            continue;
        }
        tracks.push(track);
    }

    tracks.sort_by_cached_key(|t| {
        (
            t.artist.to_lowercase(),
            t.album.as_deref().unwrap_or_default().to_lowercase(),
            t.title.to_lowercase(),
            t.source.clone(),
        )
    });

    info!(
        dir = %dir.display(),
        count = tracks.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "library scan finished"
    );
    tracks
}

/// Run [`scan`] on a background thread and post the result to `tx`.
pub fn spawn_scan(dir: PathBuf, settings: LibrarySettings, tx: Sender<ScanResult>) -> JoinHandle<()> {
    thread::spawn(move || {
        let tracks = scan(&dir, &settings);
        if tx.send(ScanResult { dir, tracks }).is_err() {
            debug!("scan result dropped, receiver is gone");
        }
    })
}
