// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! remcold - The remcol store daemon.
//!
//! Holds every remote collection in memory and serves them to remcol
//! clients over a Unix socket in the state directory.
//!
//! Usage:
//!   remcold --state-dir <path>

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use remcold::{env, Server, LOCK_NAME, LOG_NAME, PID_NAME, SOCKET_NAME};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let state_dir = parse_state_dir(&args);

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("failed to create {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    setup_logging(&state_dir.join(LOG_NAME));

    tracing::info!("remcold starting, state_dir={}", state_dir.display());

    // Acquire file lock for single instance
    let lock_path = state_dir.join(LOCK_NAME);
    let lock_file = match acquire_lock(&lock_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("failed to acquire lock: {}", e);
            std::process::exit(1);
        }
    };

    let pid_path = state_dir.join(PID_NAME);
    if let Err(e) = write_pid_file(&pid_path) {
        tracing::error!("failed to write PID file: {}", e);
        std::process::exit(1);
    }

    let socket_path = state_dir.join(SOCKET_NAME);
    let server = match Server::bind(&socket_path) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("failed to bind socket: {}", e);
            cleanup(&pid_path, &socket_path);
            std::process::exit(1);
        }
    };

    tracing::info!("listening on {}", socket_path.display());

    // Signal readiness to parent process
    println!("READY");
    let _ = std::io::stdout().flush();

    server.run();

    cleanup(&pid_path, &socket_path);
    drop(lock_file);
    tracing::info!("remcold stopped");
}

fn parse_state_dir(args: &[String]) -> PathBuf {
    args.iter()
        .position(|arg| arg == "--state-dir")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(env::default_state_dir)
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another daemon instance is already running"))?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

fn cleanup(pid_path: &Path, socket_path: &Path) {
    let _ = fs::remove_file(pid_path);
    let _ = fs::remove_file(socket_path);
}
