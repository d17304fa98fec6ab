// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Starting the remcold daemon from the command line.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::client::DaemonClient;
use crate::env;
use crate::error::{Error, Result};

const DAEMON_BINARY: &str = "remcold";

/// Find the remcold binary: `$REMCOL_DAEMON_BINARY`, then next to the
/// current executable, then `PATH`.
pub fn find_daemon_binary() -> PathBuf {
    if let Some(path) = env::daemon_binary() {
        return path;
    }
    if let Ok(exe) = std::env::current_exe() {
        let sibling = exe.with_file_name(DAEMON_BINARY);
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from(DAEMON_BINARY)
}

/// Returns a client if a daemon answers on `socket`.
pub fn detect_daemon(socket: &Path) -> Option<DaemonClient> {
    let client = DaemonClient::connect(socket).ok()?;
    client.ping().ok()?;
    Some(client)
}

/// Spawns a daemon for `state_dir` unless one already answers on `socket`.
///
/// Returns the daemon's PID.
pub fn spawn_daemon(state_dir: &Path, socket: &Path) -> Result<u32> {
    if let Some(client) = detect_daemon(socket) {
        return Ok(client.status()?.pid);
    }

    fs::create_dir_all(state_dir)?;
    let binary = find_daemon_binary();
    let mut child = Command::new(&binary)
        .arg("--state-dir")
        .arg(state_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Daemon(format!(
                "failed to start {} ({}): {}",
                DAEMON_BINARY,
                binary.display(),
                e
            ))
        })?;

    // The daemon prints READY once its socket is bound.
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    for _ in 0..150 {
        if let Ok(Some(status)) = child.try_wait() {
            let mut stderr_output = String::new();
            if let Some(mut stderr) = child.stderr.take() {
                let _ = stderr.read_to_string(&mut stderr_output);
            }
            return Err(Error::Daemon(format!(
                "daemon process exited with status: {}\n{}",
                status,
                stderr_output.trim()
            )));
        }
        if let Some(client) = detect_daemon(socket) {
            tracing::debug!(pid = child.id(), "daemon started");
            return Ok(client.status()?.pid);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Daemon(format!(
        "daemon failed to start: nothing answering on {}",
        socket.display()
    )))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
