// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::slice::Slice;

/// Remote collections served by the remcold daemon.
#[derive(Parser, Debug)]
#[command(name = "remcol", version, propagate_version = true)]
pub struct Cli {
    /// Daemon socket (overrides REMCOL_SOCKET and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Payload codec: json, cbor, json+lz4 or cbor+lz4
    #[arg(long, global = true, value_name = "CODEC")]
    pub codec: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append JSON values to a list
    Push {
        token: String,
        /// Values, each one JSON document
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
        /// Prepend at the head instead
        #[arg(long)]
        front: bool,
    },

    /// Remove and print the first value, optionally waiting for it
    Pop {
        token: String,
        /// Further lists to take from when TOKEN is empty, in priority order
        #[arg(long = "aux", value_name = "TOKEN")]
        aux: Vec<String>,
        /// Take from the tail instead of the head
        #[arg(long)]
        tail: bool,
        /// Wait for a value to arrive
        #[arg(long, short)]
        block: bool,
        /// Seconds to wait when blocking; 0 waits forever
        #[arg(long, value_name = "SECS", allow_hyphen_values = true)]
        timeout: Option<String>,
        /// Print the list the value came from before the value
        #[arg(long)]
        channel: bool,
    },

    /// Print the value at an index, or nothing when there is none
    Get {
        token: String,
        #[arg(allow_hyphen_values = true)]
        index: isize,
    },

    /// Print the values selected by a slice (start:stop[:step])
    Range {
        token: String,
        #[arg(default_value = ":", allow_hyphen_values = true)]
        slice: Slice,
    },

    /// Overwrite the value at an index
    Set {
        token: String,
        #[arg(allow_hyphen_values = true)]
        index: isize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Insert before an index, shifting later values right
    Insert {
        token: String,
        #[arg(allow_hyphen_values = true)]
        index: isize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Delete the value at an index, or every value in a slice
    Delete {
        token: String,
        /// An index such as -1, or a slice such as 1:4 or ::2
        #[arg(allow_hyphen_values = true)]
        target: String,
    },

    /// Print the length of a list
    Len { token: String },

    /// Move the tail value onto the head of a list and print it
    Rotate {
        token: String,
        /// Destination list (default: TOKEN itself)
        #[arg(long, value_name = "TOKEN")]
        to: Option<String>,
    },

    /// Delete a collection of any kind
    Drop { token: String },

    /// Manage the remcold daemon
    #[command(subcommand)]
    Daemon(DaemonCommand),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonCommand {
    /// Start the daemon if it is not running
    Start,
    /// Check that the daemon answers
    Ping,
    /// Show daemon status
    Status,
    /// Stop the daemon
    Stop,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
