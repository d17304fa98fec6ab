// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Returns the value of `REMCOL_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    path_var(vars::REMCOL_CONFIG)
}

/// Returns the value of `REMCOL_SOCKET` if set.
pub fn socket() -> Option<PathBuf> {
    path_var(vars::REMCOL_SOCKET)
}

/// Returns the value of `REMCOL_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    path_var(vars::REMCOL_STATE_DIR)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    path_var(vars::XDG_STATE_HOME)
}

/// Returns the value of `REMCOL_DAEMON_BINARY` if set.
pub fn daemon_binary() -> Option<PathBuf> {
    path_var(vars::REMCOL_DAEMON_BINARY)
}

/// Daemon state directory: `$REMCOL_STATE_DIR`, then
/// `$XDG_STATE_HOME/remcol`, then `~/.local/state/remcol`.
///
/// Must agree with the daemon's own default.
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = state_dir() {
        return dir;
    }
    if let Some(dir) = xdg_state_home() {
        return dir.join("remcol");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/remcol"))
        .unwrap_or_else(|| PathBuf::from(".local/state/remcol"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
pub(crate) mod tests;
