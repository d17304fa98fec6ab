// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! remcol-core: Shared primitives for remote collections.
//!
//! This crate provides the pieces every other remcol crate builds on: the
//! identity of a remote collection ([`Token`], [`Kind`]), the payload
//! [`Codec`], the primitive command set of a key-value store
//! ([`RemoteStore`]), and [`MemoryStore`], an in-process store implementing
//! that command set.

pub mod codec;
pub mod error;
pub mod hll;
pub mod memory;
pub mod store;
pub mod token;

pub use codec::{Codec, Compression, Format};
pub use error::{Error, Result};
pub use memory::{MemoryStore, StoreStats};
pub use store::{End, RemoteStore, SetOp, Timeout};
pub use token::{Key, Kind, Token, TOKEN_LENGTH};
