use std::path::PathBuf;

/// Opaque album-art identifier. Tracks of the same album share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtKey(pub String);

impl ArtKey {
    pub fn for_album(artist: &str, album: &str) -> Self {
        Self(format!("{}/{}", artist.to_lowercase(), album.to_lowercase()))
    }
}

/// One playable item: descriptive metadata plus the locator the backend resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Locator handed to the media backend.
    pub source: PathBuf,
    /// Length in milliseconds as reported by the tags; `0` when unknown.
    pub duration_ms: u64,
    /// `None` means the track has no art.
    pub art: Option<ArtKey>,
}
