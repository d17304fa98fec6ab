// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote hash maps keyed by canonicalised field names.

use std::marker::PhantomData;
use std::sync::Arc;

use remcol_core::{Codec, Kind, RemoteStore, Result, Token};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::handle::Handle;

/// A remote map from fields to `V` values.
///
/// Fields go through the same canonicalisation as tokens, so `1`, `"1"`
/// and `b"1"` name the same field.
pub struct Dict<V, S: RemoteStore + ?Sized = dyn RemoteStore> {
    handle: Handle<S>,
    _values: PhantomData<fn() -> V>,
}

impl<V, S> Dict<V, S>
where
    V: Serialize + DeserializeOwned,
    S: RemoteStore + ?Sized,
{
    pub fn open(store: Arc<S>, token: Option<Token>, codec: Codec) -> Result<Self> {
        Handle::open(store, token, Kind::Hash, codec).map(|handle| Self {
            handle,
            _values: PhantomData,
        })
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

    fn store(&self) -> &S {
        self.handle.store()
    }

    pub fn get_field(&self, field: impl Into<Token>) -> Result<Option<V>> {
        let raw = self.store().hash_get(self.token(), field.into().as_bytes())?;
        self.handle.decode_opt(raw)
    }

    /// Stores `value` under `field`. Returns whether the field is new.
    pub fn set_field(&self, field: impl Into<Token>, value: &V) -> Result<bool> {
        let encoded = self.handle.encode(value)?;
        self.store()
            .hash_set(self.token(), field.into().into_bytes(), encoded)
    }

    /// Returns whether the field existed.
    pub fn delete_field(&self, field: impl Into<Token>) -> Result<bool> {
        let removed = self
            .store()
            .hash_delete(self.token(), &[field.into().into_bytes()])?;
        Ok(removed > 0)
    }

    pub fn has_field(&self, field: impl Into<Token>) -> Result<bool> {
        self.store().hash_exists(self.token(), field.into().as_bytes())
    }

    pub fn len(&self) -> Result<usize> {
        self.store().hash_len(self.token())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn keys(&self) -> Result<Vec<Token>> {
        Ok(self
            .store()
            .hash_keys(self.token())?
            .into_iter()
            .map(Token::new)
            .collect())
    }

    pub fn values(&self) -> Result<Vec<V>> {
        self.handle
            .decode_all(&self.store().hash_values(self.token())?)
    }

    pub fn entries(&self) -> Result<Vec<(Token, V)>> {
        self.store()
            .hash_entries(self.token())?
            .into_iter()
            .map(|(field, raw)| Ok((Token::new(field), self.handle.decode(&raw)?)))
            .collect()
    }

    /// Reads and deletes a field.
    pub fn pop_field(&self, field: impl Into<Token>) -> Result<Option<V>> {
        let field = field.into();
        let value = self.get_field(field.clone())?;
        self.delete_field(field)?;
        Ok(value)
    }

    /// Stores every pair in order.
    pub fn update<K, I>(&self, entries: I) -> Result<()>
    where
        K: Into<Token>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (field, value) in entries {
            self.set_field(field, &value)?;
        }
        Ok(())
    }

    /// Returns the stored value, storing `default` first if the field is
    /// absent.
    pub fn set_default(&self, field: impl Into<Token>, default: V) -> Result<V> {
        let field = field.into();
        if let Some(existing) = self.get_field(field.clone())? {
            return Ok(existing);
        }
        self.set_field(field, &default)?;
        Ok(default)
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
