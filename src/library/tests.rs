use super::*;
use crate::config::TrackDisplayField;
use std::path::PathBuf;

fn track(title: &str, artist: &str, album: Option<&str>) -> Track {
    Track {
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.map(str::to_string),
        source: PathBuf::from("/music/Some File.flac"),
        duration_ms: 180_000,
        art: album.map(|a| ArtKey::for_album(artist, a)),
    }
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let t = track("Song", "Artist", None);
    assert_eq!(
        display_from_fields(&t, &[TrackDisplayField::Artist, TrackDisplayField::Title], " - "),
        "Artist - Song"
    );

    let padded = track("Song", "  Artist  ", None);
    assert_eq!(
        display_from_fields(
            &padded,
            &[TrackDisplayField::Artist, TrackDisplayField::Title],
            " - "
        ),
        "Artist - Song"
    );
}

#[test]
fn display_from_fields_skips_missing_album_and_falls_back_to_title() {
    let t = track("Song", "", None);
    assert_eq!(
        display_from_fields(&t, &[TrackDisplayField::Album, TrackDisplayField::Title], " | "),
        "Song"
    );
    assert_eq!(display_from_fields(&t, &[], " | "), "Song");
    assert_eq!(
        display_from_fields(&t, &[TrackDisplayField::Filename], " | "),
        "Some File"
    );
}

#[test]
fn art_key_is_shared_by_tracks_of_the_same_album() {
    let a = track("One", "Band", Some("Record"));
    let b = track("Two", "BAND", Some("record"));
    let c = track("Three", "Band", Some("Other"));
    assert_eq!(a.art, b.art);
    assert_ne!(a.art, c.art);
    assert!(track("Loose", "Band", None).art.is_none());
}
