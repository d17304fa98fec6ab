// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! remcol - Remote collections over a key-value store.
//!
//! Collections live in a store reached through [`RemoteStore`]: the
//! `remcold` daemon via [`DaemonClient`], or an in-process
//! [`MemoryStore`](remcol_core::MemoryStore). Handles hold only an identity
//! (store, token, codec); every operation is a round trip.
//!
//! # Main Components
//!
//! - [`List`] - positional access on a remote list, built from end pushes,
//!   range reads and trims
//! - [`Queue`] - blocking consumption across several lists with priority
//! - [`Dict`], [`Set`], [`Cardinality`] - thin handles on hashes, sets and
//!   HyperLogLog counters
//! - [`Slice`] - `start:stop:step` ranges resolved against a length
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use remcol::{DaemonClient, List, Slice};
//!
//! let client = Arc::new(DaemonClient::connect(&socket)?);
//! let list: List<String, _> = List::open(client, Some("jobs".into()), Default::default())?;
//! list.extend(&["a".to_string(), "b".to_string()])?;
//! list.delete_range(&Slice::from(..1))?;
//! ```

mod cli;
mod commands;
mod lifecycle;

pub mod client;
pub mod config;
pub mod counter;
pub mod env;
pub mod error;
pub mod handle;
pub mod hash;
pub mod queue;
pub mod sequence;
pub mod set;
pub mod slice;

pub use cli::{Cli, Command, DaemonCommand};
pub use client::DaemonClient;
pub use config::{Config, Settings};
pub use counter::Cardinality;
pub use error::{Error, Result};
pub use handle::Handle;
pub use hash::Dict;
pub use queue::{Outcome, PopOptions, Queue};
pub use remcol_core::{Codec, End, Key, Kind, RemoteStore, Timeout, Token};
pub use sequence::List;
pub use set::Set;
pub use slice::{ParseSliceError, Slice};

/// Runs a parsed command line, printing results to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load_default()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli, &config, &mut out)
}
