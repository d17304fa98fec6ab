// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the daemon.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`names`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `REMCOL_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::REMCOL_STATE_DIR)
        .ok()
        .map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// State directory used when `--state-dir` is not given.
///
/// `$REMCOL_STATE_DIR`, then `$XDG_STATE_HOME/remcol`, then
/// `~/.local/state/remcol`.
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
mod tests;
