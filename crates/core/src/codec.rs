// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Payload codec: values to opaque byte strings and back.
//!
//! A [`Codec`] is a plain configuration value. Handles receive one when they
//! are opened and may swap it later; there is no process-wide default that
//! instances mutate.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Serialization scheme applied before compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Text payloads: larger, inspectable with any client.
    #[default]
    Json,
    /// Compact binary payloads.
    Cbor,
}

/// Compression applied to serialized payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    /// LZ4 block with the uncompressed size prepended.
    Lz4,
}

/// Serialize/compress configuration shared by collection handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    pub format: Format,
    pub compression: Compression,
}

impl Codec {
    pub fn new(format: Format, compression: Compression) -> Self {
        Codec {
            format,
            compression,
        }
    }

    /// Encodes a value into an opaque payload.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let raw = match self.format {
            Format::Json => serde_json::to_vec(value)?,
            Format::Cbor => serde_cbor::to_vec(&value)?,
        };
        Ok(match self.compression {
            Compression::None => raw,
            Compression::Lz4 => lz4_flex::compress_prepend_size(&raw),
        })
    }

    /// Decodes a payload produced by [`Codec::encode`] with the same settings.
    pub fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        let raw;
        let bytes = match self.compression {
            Compression::None => payload,
            Compression::Lz4 => {
                raw = lz4_flex::decompress_size_prepended(payload)?;
                raw.as_slice()
            }
        };
        match self.format {
            Format::Json => Ok(serde_json::from_slice(bytes)?),
            Format::Cbor => Ok(serde_cbor::from_slice(bytes)?),
        }
    }

    /// Encodes every value of an iterator, stopping at the first failure.
    pub fn encode_all<'a, T, I>(&self, values: I) -> Result<Vec<Vec<u8>>>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        values.into_iter().map(|v| self.encode(v)).collect()
    }

    /// Decodes every payload in order.
    pub fn decode_all<T: DeserializeOwned>(&self, payloads: &[Vec<u8>]) -> Result<Vec<T>> {
        payloads.iter().map(|p| self.decode(p)).collect()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.format {
            Format::Json => "json",
            Format::Cbor => "cbor",
        };
        match self.compression {
            Compression::None => f.write_str(format),
            Compression::Lz4 => write!(f, "{}+lz4", format),
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let (format, compression) = match lower.split_once('+') {
            Some((format, "lz4")) => (format, Compression::Lz4),
            Some((_, other)) => {
                return Err(Error::Codec(format!("unknown compression: '{}'", other)))
            }
            None => (lower.as_str(), Compression::None),
        };
        let format = match format {
            "json" => Format::Json,
            "cbor" => Format::Cbor,
            other => return Err(Error::Codec(format!("unknown format: '{}'", other))),
        };
        Ok(Codec::new(format, compression))
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
