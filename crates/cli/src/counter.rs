// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Approximate distinct counting.

use std::sync::Arc;

use remcol_core::{Codec, Error, Kind, RemoteStore, Result, Token};
use serde::Serialize;

use crate::handle::Handle;

/// A remote HyperLogLog counter.
pub struct Cardinality<S: RemoteStore + ?Sized = dyn RemoteStore> {
    handle: Handle<S>,
}

impl<S: RemoteStore + ?Sized> Cardinality<S> {
    /// Opens a counter. A plain string already stored under the token is
    /// not a sketch and is deleted.
    pub fn open(store: Arc<S>, token: Option<Token>, codec: Codec) -> Result<Self> {
        let handle = Handle::open(store, token, Kind::String, codec)?;
        match handle.store().counter_count(std::slice::from_ref(handle.token())) {
            Ok(_) => {}
            Err(Error::WrongType { .. }) => {
                tracing::debug!(token = %handle.token(), "replacing non-sketch string");
                handle.destroy()?;
            }
            Err(e) => return Err(e),
        }
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle<S> {
        &self.handle
    }

    pub fn token(&self) -> &Token {
        self.handle.token()
    }

    pub fn clear(&self) -> Result<bool> {
        self.handle.destroy()
    }

    /// Counts `values` as seen. Returns whether the estimate may have
    /// changed.
    pub fn register<'a, T, I>(&self, values: I) -> Result<bool>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let encoded = self.handle.encode_all(values)?;
        self.handle.store().counter_add(self.token(), encoded)
    }

    /// Estimated number of distinct values registered.
    pub fn count(&self) -> Result<u64> {
        self.handle
            .store()
            .counter_count(std::slice::from_ref(self.token()))
    }

    /// Estimated distinct values across this counter and `others`.
    pub fn count_with(&self, others: &[Token]) -> Result<u64> {
        let mut tokens = Vec::with_capacity(others.len() + 1);
        tokens.push(self.token().clone());
        tokens.extend(others.iter().cloned());
        self.handle.store().counter_count(&tokens)
    }
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
