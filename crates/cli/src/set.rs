// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote sets, including store-side set algebra across tokens.

use std::marker::PhantomData;
use std::sync::Arc;

use remcol_core::{Codec, Kind, RemoteStore, Result, SetOp, Token};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::handle::Handle;

pub struct Set<T, S: RemoteStore + ?Sized = dyn RemoteStore> {
    handle: Handle<S>,
    _members: PhantomData<fn() -> T>,
}

impl<T, S> Set<T, S>
where
    T: Serialize + DeserializeOwned,
    S: RemoteStore + ?Sized,
{
    pub fn open(store: Arc<S>, token: Option<Token>, codec: Codec) -> Result<Self> {
        Handle::open(store, token, Kind::Set, codec).map(|handle| Self {
            handle,
            _members: PhantomData,
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

    /// This set's token followed by `others`.
    fn with_others(&self, others: &[Token]) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(others.len() + 1);
        tokens.push(self.token().clone());
        tokens.extend(others.iter().cloned());
        tokens
    }

    fn combine(&self, op: SetOp, others: &[Token]) -> Result<Vec<T>> {
        let raw = self.store().set_combine(op, &self.with_others(others))?;
        self.handle.decode_all(&raw)
    }

    fn combine_update(&self, op: SetOp, others: &[Token]) -> Result<usize> {
        self.store()
            .set_combine_store(op, self.token(), &self.with_others(others))
    }

    /// Returns whether the member was new.
    pub fn add(&self, member: &T) -> Result<bool> {
        Ok(self.extend([member])? > 0)
    }

    /// Adds every member. Returns how many were new.
    pub fn extend<'a, I>(&self, members: I) -> Result<usize>
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let encoded = self.handle.encode_all(members)?;
        if encoded.is_empty() {
            return Ok(0);
        }
        self.store().set_add(self.token(), encoded)
    }

    /// Returns whether the member was present.
    pub fn discard(&self, member: &T) -> Result<bool> {
        let encoded = self.handle.encode(member)?;
        Ok(self.store().set_remove(self.token(), &[encoded])? > 0)
    }

    pub fn contains(&self, member: &T) -> Result<bool> {
        let encoded = self.handle.encode(member)?;
        self.store().set_contains(self.token(), &encoded)
    }

    pub fn len(&self) -> Result<usize> {
        self.store().set_len(self.token())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn members(&self) -> Result<Vec<T>> {
        self.handle
            .decode_all(&self.store().set_members(self.token())?)
    }

    /// Removes and returns an arbitrary member.
    pub fn pop(&self) -> Result<Option<T>> {
        let raw = self.store().set_pop(self.token())?;
        self.handle.decode_opt(raw)
    }

    pub fn union(&self, others: &[Token]) -> Result<Vec<T>> {
        self.combine(SetOp::Union, others)
    }

    pub fn intersection(&self, others: &[Token]) -> Result<Vec<T>> {
        self.combine(SetOp::Intersection, others)
    }

    /// Members of this set found in none of `others`.
    pub fn difference(&self, others: &[Token]) -> Result<Vec<T>> {
        self.combine(SetOp::Difference, others)
    }

    /// Replaces this set with its union with `others`. Returns the new size.
    pub fn union_update(&self, others: &[Token]) -> Result<usize> {
        self.combine_update(SetOp::Union, others)
    }

    pub fn intersection_update(&self, others: &[Token]) -> Result<usize> {
        self.combine_update(SetOp::Intersection, others)
    }

    pub fn difference_update(&self, others: &[Token]) -> Result<usize> {
        self.combine_update(SetOp::Difference, others)
    }

    pub fn is_disjoint(&self, other: &Token) -> Result<bool> {
        let common = self
            .store()
            .set_combine(SetOp::Intersection, &self.with_others(std::slice::from_ref(other)))?;
        Ok(common.is_empty())
    }

    /// Every member of this set is also in `other`.
    pub fn is_subset(&self, other: &Token) -> Result<bool> {
        let union = self
            .store()
            .set_combine(SetOp::Union, &self.with_others(std::slice::from_ref(other)))?;
        Ok(union.len() == self.store().set_len(other)?)
    }

    /// Every member of `other` is also in this set.
    pub fn is_superset(&self, other: &Token) -> Result<bool> {
        let union = self
            .store()
            .set_combine(SetOp::Union, &self.with_others(std::slice::from_ref(other)))?;
        Ok(union.len() == self.len()?)
    }
}

#[cfg(test)]
#[path = "set_tests.rs"]
mod tests;
