// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

// Tests touching the process environment take this lock. Config tests
// share it.
pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// RAII guard that sets/removes an env var and restores it on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => std::env::set_var(self.key, val),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn test_vars_constants() {
    assert_eq!(vars::REMCOL_CONFIG, "REMCOL_CONFIG");
    assert_eq!(vars::REMCOL_SOCKET, "REMCOL_SOCKET");
    assert_eq!(vars::REMCOL_STATE_DIR, "REMCOL_STATE_DIR");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::REMCOL_DAEMON_BINARY, "REMCOL_DAEMON_BINARY");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

#[test]
fn test_socket_set() {
    let _lock = lock_env();
    let _guard = EnvGuard::set(vars::REMCOL_SOCKET, "/tmp/remcol.sock");
    assert_eq!(socket(), Some(PathBuf::from("/tmp/remcol.sock")));
}

#[test]
fn test_empty_value_is_unset() {
    let _lock = lock_env();
    let _guard = EnvGuard::set(vars::REMCOL_CONFIG, "");
    assert_eq!(config_path(), None);
}

#[test]
fn test_daemon_binary_unset() {
    let _lock = lock_env();
    let _guard = EnvGuard::remove(vars::REMCOL_DAEMON_BINARY);
    assert_eq!(daemon_binary(), None);
}

#[test]
fn test_default_state_dir_prefers_override() {
    let _lock = lock_env();
    let _state = EnvGuard::set(vars::REMCOL_STATE_DIR, "/explicit");
    let _xdg = EnvGuard::set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(default_state_dir(), PathBuf::from("/explicit"));
}

#[test]
fn test_default_state_dir_uses_xdg() {
    let _lock = lock_env();
    let _state = EnvGuard::remove(vars::REMCOL_STATE_DIR);
    let _xdg = EnvGuard::set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(default_state_dir(), PathBuf::from("/xdg/remcol"));
}
