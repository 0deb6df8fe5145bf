use super::*;
use crate::library::ArtKey;
use std::path::PathBuf;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        source: PathBuf::from("/tmp/music/test.mp3"),
        duration_ms: 1_234,
        art: Some(ArtKey::for_album("Test Artist", "Test Album")),
    }
}

fn make_handle() -> (MprisHandle, Arc<Mutex<SharedState>>, Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
        sequence: 0,
    };
    (handle, state, notify_rx)
}

#[test]
fn show_and_dismiss_set_and_clear_shared_state() {
    let (mut handle, state, notify) = make_handle();

    handle.show(&make_track());
    {
        let s = state.lock().unwrap();
        assert_eq!(s.playback, PlayerState::Playing);
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.art_key.as_deref(), Some("test artist/test album"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_000));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/1")
        );
    }
    assert!(notify.try_recv().is_ok());

    handle.dismiss();
    {
        let s = state.lock().unwrap();
        assert_eq!(s.playback, PlayerState::Idle);
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.art_key, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn update_gives_each_track_a_new_id() {
    let (mut handle, state, _notify) = make_handle();
    handle.show(&make_track());
    handle.update(&make_track());
    let s = state.lock().unwrap();
    assert_eq!(
        s.track_id.as_ref().map(|p| p.as_str()),
        Some("/org/mpris/MediaPlayer2/track/2")
    );
}

#[test]
fn unknown_length_is_left_out() {
    let (mut handle, state, _notify) = make_handle();
    let track = Track {
        duration_ms: 0,
        ..make_track()
    };
    handle.show(&track);
    assert_eq!(state.lock().unwrap().length_micros, None);
}

#[test]
fn playback_status_follows_pause_and_resume() {
    let (mut handle, state, _notify) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");
    handle.show(&make_track());
    assert_eq!(iface.playback_status(), "Playing");
    handle.set_paused(true);
    assert_eq!(iface.playback_status(), "Paused");
    handle.set_paused(false);
    assert_eq!(iface.playback_status(), "Playing");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (mut handle, state, _notify) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    assert!(iface.metadata().is_empty());

    handle.show(&make_track());
    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "encore:artKey",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn set_position_only_applies_to_current_track() {
    let (mut handle, state, _notify) = make_handle();
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };
    handle.show(&make_track());

    let stale = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/99").unwrap();
    iface.set_position(stale, 5_000_000);
    assert!(rx.try_recv().is_err());

    let current = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/1").unwrap();
    iface.set_position(current, 5_000_000);
    assert_eq!(rx.try_recv().unwrap(), ControlCmd::SetPosition(5_000_000));
}

#[test]
fn position_reports_published_progress() {
    let (handle, state, _notify) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };
    handle.set_position_ms(2_500);
    assert_eq!(iface.position(), 2_500_000);
}
