// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for client-daemon communication.
//!
//! This crate defines the message types and framing protocol used between
//! remcol clients and the `remcold` daemon. Messages are serialized as JSON
//! with length-prefixed framing. Tokens and payloads are opaque bytes and
//! travel as lowercase hex strings.

use std::fmt;

use remcol_core::{End, Error, Kind, SetOp, Timeout, Token};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Byte strings
// ============================================================================

/// Opaque bytes, serialized as a lowercase hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn into_token(self) -> Token {
        Token::new(self.0)
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl From<&Token> for Bytes {
    fn from(token: &Token) -> Self {
        Bytes(token.as_bytes().to_vec())
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = Bytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex-encoded byte string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
                hex::decode(v).map(Bytes).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

/// Converts a slice of tokens to their wire form.
pub fn tokens_to_wire(tokens: &[Token]) -> Vec<Bytes> {
    tokens.iter().map(Bytes::from).collect()
}

/// Converts wire byte strings back to tokens.
pub fn tokens_from_wire(tokens: Vec<Bytes>) -> Vec<Token> {
    tokens.into_iter().map(Bytes::into_token).collect()
}

/// Converts owned payloads to their wire form.
pub fn values_to_wire(values: Vec<Vec<u8>>) -> Vec<Bytes> {
    values.into_iter().map(Bytes).collect()
}

/// Converts wire payloads back to owned byte vectors.
pub fn values_from_wire(values: Vec<Bytes>) -> Vec<Vec<u8>> {
    values.into_iter().map(Bytes::into_vec).collect()
}

// ============================================================================
// Requests
// ============================================================================

/// Request sent from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonRequest {
    /// Request daemon status.
    Status,
    /// Request daemon shutdown.
    Shutdown,
    /// Health check.
    Ping,
    /// Version handshake.
    Hello { version: String },
    /// Execute one primitive store command.
    Store(StoreOp),
}

/// One primitive command of the remote store.
///
/// Each variant maps onto exactly one [`remcol_core::RemoteStore`] method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    TypeOf {
        token: Bytes,
    },
    Delete {
        token: Bytes,
    },
    Range {
        token: Bytes,
        start: i64,
        stop: i64,
    },
    Trim {
        token: Bytes,
        start: i64,
        stop: i64,
    },
    Push {
        token: Bytes,
        end: End,
        values: Vec<Bytes>,
    },
    Pop {
        token: Bytes,
        end: End,
    },
    BlockingPop {
        tokens: Vec<Bytes>,
        end: End,
        timeout: Timeout,
    },
    PopPush {
        source: Bytes,
        dest: Bytes,
        end: End,
    },
    BlockingPopPush {
        source: Bytes,
        dest: Bytes,
        end: End,
        timeout: Timeout,
    },
    Len {
        token: Bytes,
    },
    Index {
        token: Bytes,
        index: i64,
    },
    SetAt {
        token: Bytes,
        index: i64,
        value: Bytes,
    },
    Position {
        token: Bytes,
        value: Bytes,
    },
    RemoveEqual {
        token: Bytes,
        value: Bytes,
    },
    HashGet {
        token: Bytes,
        field: Bytes,
    },
    HashSet {
        token: Bytes,
        field: Bytes,
        value: Bytes,
    },
    HashDelete {
        token: Bytes,
        fields: Vec<Bytes>,
    },
    HashExists {
        token: Bytes,
        field: Bytes,
    },
    HashLen {
        token: Bytes,
    },
    HashKeys {
        token: Bytes,
    },
    HashValues {
        token: Bytes,
    },
    HashEntries {
        token: Bytes,
    },
    SetAdd {
        token: Bytes,
        members: Vec<Bytes>,
    },
    SetRemove {
        token: Bytes,
        members: Vec<Bytes>,
    },
    SetContains {
        token: Bytes,
        member: Bytes,
    },
    SetLen {
        token: Bytes,
    },
    SetMembers {
        token: Bytes,
    },
    SetPop {
        token: Bytes,
    },
    SetCombine {
        set_op: SetOp,
        tokens: Vec<Bytes>,
    },
    SetCombineStore {
        set_op: SetOp,
        dest: Bytes,
        tokens: Vec<Bytes>,
    },
    CounterAdd {
        token: Bytes,
        values: Vec<Bytes>,
    },
    CounterCount {
        tokens: Vec<Bytes>,
    },
}

impl StoreOp {
    /// The blocking timeout carried by this command, if it may wait.
    pub fn blocking_timeout(&self) -> Option<Timeout> {
        match self {
            StoreOp::BlockingPop { timeout, .. } | StoreOp::BlockingPopPush { timeout, .. } => {
                Some(*timeout)
            }
            _ => None,
        }
    }

    /// Short command name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StoreOp::TypeOf { .. } => "type_of",
            StoreOp::Delete { .. } => "delete",
            StoreOp::Range { .. } => "range",
            StoreOp::Trim { .. } => "trim",
            StoreOp::Push { .. } => "push",
            StoreOp::Pop { .. } => "pop",
            StoreOp::BlockingPop { .. } => "blocking_pop",
            StoreOp::PopPush { .. } => "pop_push",
            StoreOp::BlockingPopPush { .. } => "blocking_pop_push",
            StoreOp::Len { .. } => "len",
            StoreOp::Index { .. } => "index",
            StoreOp::SetAt { .. } => "set_at",
            StoreOp::Position { .. } => "position",
            StoreOp::RemoveEqual { .. } => "remove_equal",
            StoreOp::HashGet { .. } => "hash_get",
            StoreOp::HashSet { .. } => "hash_set",
            StoreOp::HashDelete { .. } => "hash_delete",
            StoreOp::HashExists { .. } => "hash_exists",
            StoreOp::HashLen { .. } => "hash_len",
            StoreOp::HashKeys { .. } => "hash_keys",
            StoreOp::HashValues { .. } => "hash_values",
            StoreOp::HashEntries { .. } => "hash_entries",
            StoreOp::SetAdd { .. } => "set_add",
            StoreOp::SetRemove { .. } => "set_remove",
            StoreOp::SetContains { .. } => "set_contains",
            StoreOp::SetLen { .. } => "set_len",
            StoreOp::SetMembers { .. } => "set_members",
            StoreOp::SetPop { .. } => "set_pop",
            StoreOp::SetCombine { .. } => "set_combine",
            StoreOp::SetCombineStore { .. } => "set_combine_store",
            StoreOp::CounterAdd { .. } => "counter_add",
            StoreOp::CounterCount { .. } => "counter_count",
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response sent from the daemon to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonResponse {
    /// Status response.
    Status(DaemonStatus),
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Pong response.
    Pong,
    /// Error response.
    Error { code: ErrorCode, message: String },
    /// Version handshake response.
    Hello { version: String },
    /// Result of a store command.
    Reply(Reply),
}

/// Results of store commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Reply {
    /// Command succeeded with nothing to return.
    Done,
    Kind { kind: Option<Kind> },
    Bool { value: bool },
    Count { count: u64 },
    Position { position: Option<u64> },
    Value { value: Option<Bytes> },
    Values { values: Vec<Bytes> },
    Entries { entries: Vec<(Bytes, Bytes)> },
    /// Item delivered by a blocking pop, with the channel it came from.
    Delivered { delivered: Option<(Bytes, Bytes)> },
}

impl Reply {
    pub fn count(n: usize) -> Reply {
        Reply::Count { count: n as u64 }
    }

    pub fn value(value: Option<Vec<u8>>) -> Reply {
        Reply::Value {
            value: value.map(Bytes),
        }
    }

    pub fn values(values: Vec<Vec<u8>>) -> Reply {
        Reply::Values {
            values: values_to_wire(values),
        }
    }

    /// Name of the variant, used when reporting a mismatched reply.
    pub fn name(&self) -> &'static str {
        match self {
            Reply::Done => "done",
            Reply::Kind { .. } => "kind",
            Reply::Bool { .. } => "bool",
            Reply::Count { .. } => "count",
            Reply::Position { .. } => "position",
            Reply::Value { .. } => "value",
            Reply::Values { .. } => "values",
            Reply::Entries { .. } => "entries",
            Reply::Delivered { .. } => "delivered",
        }
    }
}

/// Machine-readable error category, carrying what the client needs to
/// rebuild the matching [`remcol_core::Error`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ErrorCode {
    OutOfRange {
        index: i64,
        len: usize,
    },
    WrongType {
        token: String,
        expected: String,
        found: String,
    },
    NoSuchKey {
        token: String,
    },
    Closed,
    Internal,
}

impl ErrorCode {
    /// Classifies a store error for the wire.
    pub fn classify(err: &Error) -> ErrorCode {
        match err {
            Error::IndexOutOfRange { index, len } => ErrorCode::OutOfRange {
                index: *index,
                len: *len,
            },
            Error::WrongType {
                token,
                expected,
                found,
            } => ErrorCode::WrongType {
                token: token.clone(),
                expected: expected.clone(),
                found: found.clone(),
            },
            Error::NoSuchKey(token) => ErrorCode::NoSuchKey {
                token: token.clone(),
            },
            Error::Closed => ErrorCode::Closed,
            _ => ErrorCode::Internal,
        }
    }

    /// Rebuilds the store error on the client side.
    pub fn into_error(self, message: String) -> Error {
        match self {
            ErrorCode::OutOfRange { index, len } => Error::IndexOutOfRange { index, len },
            ErrorCode::WrongType {
                token,
                expected,
                found,
            } => Error::WrongType {
                token,
                expected,
                found,
            },
            ErrorCode::NoSuchKey { token } => Error::NoSuchKey(token),
            ErrorCode::Closed => Error::Closed,
            ErrorCode::Internal => Error::Store(message),
        }
    }
}

/// Daemon status information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    /// Current daemon PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Number of tokens currently held by the store.
    pub keys: usize,
}

impl DaemonStatus {
    /// Create a new status with the given parameters.
    pub fn new(pid: u32, uptime_secs: u64, keys: usize) -> Self {
        Self {
            pid,
            uptime_secs,
            keys,
        }
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    /// Maximum message size (16 MiB). Hex doubles payload size on the wire.
    pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let json = serde_json::to_vec(message)
            .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
        if json.len() > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                json.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
