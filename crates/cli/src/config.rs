// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command line configuration.
//!
//! Configuration is read from `remcol.toml`, found at `$REMCOL_CONFIG` or
//! in the platform config directory (`~/.config/remcol/remcol.toml` on
//! Linux). A missing file means defaults:
//! - `socket`: daemon socket path (default: `<state dir>/daemon.sock`)
//! - `codec`: payload codec, e.g. `json`, `cbor`, `cbor+lz4` (default: `json`)
//! - `timeout_secs`: blocking pop timeout when `--timeout` is not given
//!   (default: 0, wait forever)

use std::fs;
use std::path::{Path, PathBuf};

use remcol_core::{Codec, Timeout};
use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "remcol";
const CONFIG_FILE_NAME: &str = "remcol.toml";
const SOCKET_NAME: &str = "daemon.sock";

/// Settings stored in `remcol.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,
    pub codec: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: None,
            codec: "json".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Config {
    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Loads from `$REMCOL_CONFIG` or the default location.
    pub fn load_default() -> Result<Self> {
        match default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn codec(&self) -> Result<Codec> {
        self.codec
            .parse()
            .map_err(|e| Error::Config(format!("codec '{}': {}", self.codec, e)))
    }
}

/// Location of the config file, if one can be determined.
pub fn default_path() -> Option<PathBuf> {
    env::config_path()
        .or_else(|| dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
}

/// Effective settings for one invocation: command line flags, then
/// environment, then the config file, then defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub socket: PathBuf,
    pub state_dir: PathBuf,
    pub codec: Codec,
    pub timeout: Timeout,
}

impl Settings {
    pub fn resolve(
        socket: Option<PathBuf>,
        codec: Option<&str>,
        config: &Config,
    ) -> Result<Self> {
        let state_dir = env::default_state_dir();
        let socket = socket
            .or_else(env::socket)
            .or_else(|| config.socket.clone())
            .unwrap_or_else(|| state_dir.join(SOCKET_NAME));
        let codec = match codec {
            Some(codec) => codec
                .parse()
                .map_err(|e| Error::Config(format!("codec '{}': {}", codec, e)))?,
            None => config.codec()?,
        };
        Ok(Self {
            socket,
            state_dir,
            codec,
            timeout: Timeout(config.timeout_secs),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
