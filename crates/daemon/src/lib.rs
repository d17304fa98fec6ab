// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! remcold: the remcol store daemon.
//!
//! Owns a [`remcol_core::MemoryStore`] and serves it over a Unix socket
//! using the `remcol-ipc` protocol. The binary wraps [`Server`] with
//! logging, a single-instance lock and a PID file; tests embed [`Server`]
//! directly on a thread.

pub mod env;
pub mod handler;
pub mod server;

pub use handler::{apply, handle_request, serve_request, Context, PopOrigin};
pub use server::Server;

/// Socket filename within the state directory.
pub const SOCKET_NAME: &str = "daemon.sock";
/// PID filename within the state directory.
pub const PID_NAME: &str = "daemon.pid";
/// Lock filename for single instance guarantee.
pub const LOCK_NAME: &str = "daemon.lock";
/// Log filename within the state directory.
pub const LOG_NAME: &str = "daemon.log";
