//! Library provider: turns a directory of audio files into playlist tracks.
//!
//! Scanning walks the filesystem and reads tags, so it runs on a background
//! thread and posts its result back over a channel (see [`spawn_scan`]).

mod display;
mod model;
mod scan;

pub use display::display_from_fields;
pub use model::{ArtKey, Track};
pub use scan::{ScanResult, spawn_scan};

#[cfg(test)]
mod tests;
