// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identity of one remote collection: store, token, kind and codec.

use std::sync::Arc;

use remcol_core::{Codec, Kind, RemoteStore, Result, Token};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed reference to one entry of a remote store.
///
/// Several handles may share a token; they then address the same remote
/// data. Nothing is cached locally.
pub struct Handle<S: RemoteStore + ?Sized> {
    store: Arc<S>,
    token: Token,
    kind: Kind,
    codec: Codec,
}

impl<S: RemoteStore + ?Sized> Handle<S> {
    /// Opens a handle, generating a random token when none is given.
    ///
    /// An existing entry of a different kind is stale data: it is deleted
    /// so the handle starts from an empty collection.
    pub fn open(store: Arc<S>, token: Option<Token>, kind: Kind, codec: Codec) -> Result<Self> {
        let token = token.unwrap_or_else(Token::random);
        if let Some(found) = store.type_of(&token)? {
            if found != kind {
                tracing::debug!(%token, %found, expected = %kind, "replacing stale entry");
                store.delete(&token)?;
            }
        }
        Ok(Self {
            store,
            token,
            kind,
            codec,
        })
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn set_codec(&mut self, codec: Codec) {
        self.codec = codec;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A second handle on the same token. Contents are shared, not copied.
    pub fn alias(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            token: self.token.clone(),
            kind: self.kind,
            codec: self.codec,
        }
    }

    /// Removes the remote entry unconditionally.
    pub fn destroy(&self) -> Result<bool> {
        self.store.delete(&self.token)
    }

    pub(crate) fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.codec.encode(value)
    }

    pub(crate) fn encode_all<'a, T, I>(&self, values: I) -> Result<Vec<Vec<u8>>>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.codec.encode_all(values)
    }

    pub(crate) fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        self.codec.decode(payload)
    }

    pub(crate) fn decode_opt<T: DeserializeOwned>(
        &self,
        payload: Option<Vec<u8>>,
    ) -> Result<Option<T>> {
        payload.map(|p| self.decode(&p)).transpose()
    }

    pub(crate) fn decode_all<T: DeserializeOwned>(&self, payloads: &[Vec<u8>]) -> Result<Vec<T>> {
        self.codec.decode_all(payloads)
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
