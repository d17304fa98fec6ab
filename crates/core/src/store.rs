// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The primitive command set of a remote key-value store.
//!
//! Collection handles are built only on these commands. Each command is a
//! single request against the store and is atomic there; sequences of
//! commands are not.
//!
//! Index arguments follow the store's conventions: list ranges are
//! inclusive (`start..=stop`), negative indices count from the end, and
//! out-of-range bounds are clamped by `range` and `trim`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::token::{Kind, Token};

/// Which end of a sequence a push or pop addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum End {
    Head,
    Tail,
}

impl End {
    /// The other end of the sequence.
    pub fn opposite(self) -> End {
        match self {
            End::Head => End::Tail,
            End::Tail => End::Head,
        }
    }
}

/// Upper bound, in whole seconds, on how long a blocking command may wait.
///
/// `Timeout(0)` means wait indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timeout(pub u64);

impl Timeout {
    /// Wait until an item arrives, however long that takes.
    pub const FOREVER: Timeout = Timeout(0);

    /// Clamps a caller-supplied number of seconds.
    ///
    /// Fractions are truncated. Negative, NaN and infinite inputs become `0`.
    pub fn from_secs_f64(secs: f64) -> Timeout {
        if secs.is_finite() && secs >= 0.0 {
            Timeout(secs.trunc() as u64)
        } else {
            Timeout(0)
        }
    }

    /// Clamps caller-supplied text. Non-numeric input becomes `0`.
    pub fn parse(input: &str) -> Timeout {
        input
            .trim()
            .parse::<f64>()
            .map(Timeout::from_secs_f64)
            .unwrap_or(Timeout(0))
    }

    pub fn secs(self) -> u64 {
        self.0
    }

    pub fn is_forever(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forever() {
            f.write_str("forever")
        } else {
            write!(f, "{}s", self.0)
        }
    }
}

/// Store-side combination of several sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOp {
    Union,
    Intersection,
    /// Members of the first set absent from every other set.
    Difference,
}

/// Primitive commands offered by a remote key-value store.
pub trait RemoteStore: Send + Sync {
    // Keyspace

    /// Returns the kind of the entry under `token`, or `None` if absent.
    fn type_of(&self, token: &Token) -> Result<Option<Kind>>;

    /// Removes the entry under `token`. Returns whether anything was removed.
    fn delete(&self, token: &Token) -> Result<bool>;

    fn exists(&self, token: &Token) -> Result<bool> {
        Ok(self.type_of(token)?.is_some())
    }

    // Lists

    /// Reads the inclusive range `start..=stop`.
    fn range(&self, token: &Token, start: i64, stop: i64) -> Result<Vec<Vec<u8>>>;

    /// Keeps only the inclusive range `start..=stop`, discarding the rest.
    fn trim(&self, token: &Token, start: i64, stop: i64) -> Result<()>;

    /// Pushes values one at a time onto `end`. Returns the new length.
    ///
    /// Pushing `[a, b, c]` onto the head leaves the list starting `c, b, a`.
    fn push(&self, token: &Token, end: End, values: Vec<Vec<u8>>) -> Result<usize>;

    fn pop(&self, token: &Token, end: End) -> Result<Option<Vec<u8>>>;

    /// Pops from the first listed token holding data, waiting up to
    /// `timeout` for one to become non-empty.
    fn blocking_pop(
        &self,
        tokens: &[Token],
        end: End,
        timeout: Timeout,
    ) -> Result<Option<(Token, Vec<u8>)>>;

    /// Pops from `end` of `source` and pushes onto the opposite end of `dest`.
    fn pop_push(&self, source: &Token, dest: &Token, end: End) -> Result<Option<Vec<u8>>>;

    fn blocking_pop_push(
        &self,
        source: &Token,
        dest: &Token,
        end: End,
        timeout: Timeout,
    ) -> Result<Option<Vec<u8>>>;

    fn len(&self, token: &Token) -> Result<usize>;

    fn index(&self, token: &Token, index: i64) -> Result<Option<Vec<u8>>>;

    /// Overwrites the element at `index`; fails when out of bounds.
    fn set_at(&self, token: &Token, index: i64, value: Vec<u8>) -> Result<()>;

    /// Position of the first element equal to `value`.
    fn position(&self, token: &Token, value: &[u8]) -> Result<Option<usize>>;

    /// Removes every element equal to `value`. Returns how many were removed.
    fn remove_equal(&self, token: &Token, value: &[u8]) -> Result<usize>;

    // Hashes

    fn hash_get(&self, token: &Token, field: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Returns whether the field was newly created.
    fn hash_set(&self, token: &Token, field: Vec<u8>, value: Vec<u8>) -> Result<bool>;

    fn hash_delete(&self, token: &Token, fields: &[Vec<u8>]) -> Result<usize>;

    fn hash_exists(&self, token: &Token, field: &[u8]) -> Result<bool>;

    fn hash_len(&self, token: &Token) -> Result<usize>;

    fn hash_keys(&self, token: &Token) -> Result<Vec<Vec<u8>>>;

    fn hash_values(&self, token: &Token) -> Result<Vec<Vec<u8>>>;

    fn hash_entries(&self, token: &Token) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    // Sets

    /// Returns how many members were newly added.
    fn set_add(&self, token: &Token, members: Vec<Vec<u8>>) -> Result<usize>;

    fn set_remove(&self, token: &Token, members: &[Vec<u8>]) -> Result<usize>;

    fn set_contains(&self, token: &Token, member: &[u8]) -> Result<bool>;

    fn set_len(&self, token: &Token) -> Result<usize>;

    fn set_members(&self, token: &Token) -> Result<Vec<Vec<u8>>>;

    fn set_pop(&self, token: &Token) -> Result<Option<Vec<u8>>>;

    fn set_combine(&self, op: SetOp, tokens: &[Token]) -> Result<Vec<Vec<u8>>>;

    /// Stores the combination under `dest`, replacing it. Returns its size.
    fn set_combine_store(&self, op: SetOp, dest: &Token, tokens: &[Token]) -> Result<usize>;

    // Cardinality estimators

    /// Registers values. Returns whether the estimate may have changed.
    fn counter_add(&self, token: &Token, values: Vec<Vec<u8>>) -> Result<bool>;

    /// Estimated number of distinct values registered across `tokens`.
    fn counter_count(&self, tokens: &[Token]) -> Result<u64>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
