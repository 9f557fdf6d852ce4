//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on disk.  The
//! file may name any subset of [`SystemConfig`] fields; the rest keep
//! their defaults.
//!
//! A file the operator named must exist.  Only the built-in default path
//! may be absent, in which case the whole default config applies.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

pub struct JsonConfigFile {
    path: PathBuf,
    /// A missing file yields the defaults instead of `NotFound`.
    optional: bool,
}

impl JsonConfigFile {
    /// A file that must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
        }
    }

    /// A file that may be absent.
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: true,
        }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if !self.optional {
                    return Err(ConfigError::NotFound);
                }
                warn!("ConfigFile: {} not found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(e.kind())),
        };
        let cfg: SystemConfig = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        info!("ConfigFile: loaded {}", self.path.display());
        Ok(cfg)
    }
}
