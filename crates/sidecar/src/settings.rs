//! Persisted preferences: whether to attach, where, to which browser.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sidecar_attach::Side;
use thiserror::Error;
use tracing::debug;

/// Default companion width in points.
pub const DEFAULT_WIDTH: f64 = 340.0;

/// Errors reading or writing the settings file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("settings I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dock beside the browser instead of floating freely.
    pub attach_enabled: bool,
    pub side: Side,
    /// Bundle identifier to attach to. `None` follows the system default
    /// browser.
    pub browser: Option<String>,
    pub companion_width: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            attach_enabled: true,
            side: Side::Left,
            browser: None,
            companion_width: DEFAULT_WIDTH,
        }
    }
}

/// `~/.sidecar/settings.json`.
pub fn default_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".sidecar");
    p.push("settings.json");
    p
}

impl Settings {
    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to `path`, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let io_err = |source: io::Error| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(io_err)?;
        debug!("settings saved to {}", path.display());
        Ok(())
    }
}
