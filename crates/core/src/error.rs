// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for remcol-core operations.

use thiserror::Error;

/// All possible errors that can occur while talking to a remote store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported key type: {0}\n  hint: keys may be text, bytes, numbers, or tuples/ranges of those")]
    UnsupportedKey(String),

    #[error("index out of range: {index} (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("slice step cannot be zero")]
    InvalidStep,

    #[error("value not found in sequence")]
    ValueNotFound,

    #[error("wrong type for {token}: expected {expected}, found {found}")]
    WrongType {
        token: String,
        expected: String,
        found: String,
    },

    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("store is closed")]
    Closed,

    #[error("store error: {0}")]
    Store(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cbor error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    #[error("decompress error: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),
}

/// A specialized Result type for remcol-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
