// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::slice::ParseSliceError;

/// Errors surfaced by the `remcol` command line.
///
/// Collection handles report [`remcol_core::Error`]; this type wraps it
/// together with the failures that only the command line can hit.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] remcol_core::Error),

    #[error("invalid value '{value}': {reason}\n  hint: values are JSON, so quote strings: '\"text\"'")]
    InvalidValue { value: String, reason: String },

    #[error("invalid index '{0}'\n  hint: use an integer such as 3 or -1, or a slice such as 1:4")]
    InvalidIndex(String),

    #[error(transparent)]
    Slice(#[from] ParseSliceError),

    #[error("config error: {0}")]
    Config(String),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for command line operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
