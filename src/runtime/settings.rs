use std::path::Path;

use crate::config;
use crate::error::Error;

/// Load settings for this run.
///
/// An explicitly named file must load and validate. Otherwise config is
/// optional: failures fall back to defaults and the reason is handed back so
/// it can be logged once logging is up.
pub fn load_settings(explicit: Option<&Path>) -> Result<(config::Settings, Option<String>), Error> {
    match explicit {
        Some(path) => {
            let s = config::Settings::load_from(Some(path)).map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            })?;
            s.validate().map_err(|reason| Error::InvalidConfig {
                path: path.to_path_buf(),
                reason,
            })?;
            Ok((s, None))
        }
        None => match config::Settings::load() {
            Ok(s) => match s.validate() {
                Ok(()) => Ok((s, None)),
                Err(msg) => Ok((
                    config::Settings::default(),
                    Some(format!("invalid config, using defaults: {msg}")),
                )),
            },
            Err(e) => Ok((
                config::Settings::default(),
                Some(format!("failed to load config, using defaults: {e}")),
            )),
        },
    }
}
