use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_encore_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", "/tmp/encore-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/encore-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("encore")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("encore")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 123

[playback]
error_skip_limit = 4

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
progress_poll_ms = 250
track_fields = ["title", "file"]
track_separator = " • "

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
min_duration_ms = 0
unknown_artist = "???"

[logging]
file = "/tmp/encore.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ENCORE__AUDIO__QUIT_FADE_OUT_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert_eq!(s.playback.error_skip_limit, 4);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.progress_poll_ms, 250);
    assert_eq!(
        s.ui.track_fields,
        vec![TrackDisplayField::Title, TrackDisplayField::Filename]
    );
    assert_eq!(s.ui.track_separator, " • ");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.min_duration_ms, 0);
    assert_eq!(s.library.unknown_artist, "???");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/encore.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE__AUDIO__QUIT_FADE_OUT_MS", "0");

    let s = Settings::load_from(Some(&cfg_path)).unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 0);
}

#[test]
fn missing_default_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");
    let _g = EnvGuard::set("ENCORE_CONFIG_PATH", absent.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.ui.progress_poll_ms, 1000);
    assert_eq!(s.playback.error_skip_limit, 0);
    assert_eq!(s.library.min_duration_ms, 10_000);
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();

    assert!(Settings::load_from(Some(&dir.path().join("absent.toml"))).is_err());
}

#[test]
fn validate_rejects_fast_polling_and_zero_scrub() {
    let mut s = Settings::default();
    s.ui.progress_poll_ms = 10;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.scrub_seconds = 0;
    assert!(s.validate().is_err());
}

#[test]
fn effective_settings_render_as_toml() {
    let rendered = Settings::default().to_toml().unwrap();
    assert!(rendered.contains("[playback]"));
    assert!(rendered.contains("progress_poll_ms = 1000"));
    assert!(rendered.contains("track_fields = [\"artist\", \"title\"]"));
}
