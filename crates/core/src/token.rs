// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identity of a remote collection.
//!
//! A [`Token`] is the opaque byte string naming one remote entry. Callers may
//! name entries with any [`Key`] form; each form has exactly one canonical
//! byte rendering so that equal keys always address the same entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length in bytes of randomly generated tokens.
pub const TOKEN_LENGTH: usize = 16;

/// Opaque byte-string identifier of one remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Vec<u8>);

impl Token {
    /// Wraps raw bytes without canonicalisation.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Token(bytes.into())
    }

    /// Generates a fresh random token of [`TOKEN_LENGTH`] bytes.
    pub fn random() -> Self {
        let bytes: [u8; TOKEN_LENGTH] = rand::random();
        Token(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Token {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if !s.chars().any(char::is_control) => f.write_str(s),
            _ => f.write_str(&hex::encode(&self.0)),
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.as_bytes().to_vec())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s.into_bytes())
    }
}

impl From<Vec<u8>> for Token {
    fn from(bytes: Vec<u8>) -> Self {
        Token(bytes)
    }
}

impl From<&[u8]> for Token {
    fn from(bytes: &[u8]) -> Self {
        Token(bytes.to_vec())
    }
}

impl From<i64> for Token {
    fn from(n: i64) -> Self {
        Key::Int(n).into()
    }
}

impl From<Key> for Token {
    fn from(key: Key) -> Self {
        Token(key.to_bytes())
    }
}

impl TryFrom<&serde_json::Value> for Token {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        Key::try_from(value).map(Token::from)
    }
}

/// A caller-supplied key, canonicalised to bytes when it becomes a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Bytes(Vec<u8>),
    Text(String),
    Int(i64),
    Float(f64),
    /// Fixed-size composite, rendered as `(a, b)`.
    Tuple(Vec<Key>),
    /// Half-open integer range, rendered as `range(a, b)`.
    Range(i64, i64),
}

impl Key {
    /// Returns the canonical byte rendering of this key.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Key::Bytes(b) => b.clone(),
            other => other.render().into_bytes(),
        }
    }

    fn render(&self) -> String {
        match self {
            Key::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Key::Text(s) => s.clone(),
            Key::Int(n) => n.to_string(),
            Key::Float(x) => format!("{:?}", x),
            Key::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Key::render_member).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
            Key::Range(start, stop) => format!("range({}, {})", start, stop),
        }
    }

    /// Rendering of a key nested inside a tuple, where text is quoted.
    fn render_member(&self) -> String {
        match self {
            Key::Bytes(b) => format!("b'{}'", String::from_utf8_lossy(b)),
            Key::Text(s) => format!("'{}'", s),
            other => other.render(),
        }
    }

    fn scalar(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Key::Text(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Key::Int(i)),
                None => n
                    .as_f64()
                    .map(Key::Float)
                    .ok_or_else(|| Error::UnsupportedKey(n.to_string())),
            },
            other => Err(Error::UnsupportedKey(json_type_name(other).to_string())),
        }
    }
}

impl TryFrom<&serde_json::Value> for Key {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Array(items) => items
                .iter()
                .map(Key::scalar)
                .collect::<Result<Vec<_>>>()
                .map(Key::Tuple),
            other => Key::scalar(other),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "nested array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Structural kind of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Hash,
    List,
    Set,
    /// Plain string values; cardinality sketches are stored under this kind.
    String,
}

impl Kind {
    /// Returns the string representation used on the wire and in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Hash => "hash",
            Kind::List => "list",
            Kind::Set => "set",
            Kind::String => "string",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
