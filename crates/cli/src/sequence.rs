// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote lists with positional access.
//!
//! The store only pushes and pops at the ends, reads contiguous ranges and
//! trims a list down to a contiguous range. Positional deletes and inserts
//! are built from those by splicing: read the shorter surviving side, trim
//! the list past the affected position, then push that side back on. Only
//! `min(i, len - i)` elements cross the wire.
//!
//! None of the multi-command operations are atomic. A concurrent writer
//! between the length read and the push-back can corrupt the list, and a
//! connection lost after the trim leaves the list truncated. Callers with
//! concurrent mutators need external coordination.

use std::marker::PhantomData;
use std::sync::Arc;

use remcol_core::{Codec, End, Error, Kind, RemoteStore, Result, Token};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::handle::Handle;
use crate::slice::Slice;

/// Resolves a possibly negative index against `len`.
fn resolve(index: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

fn out_of_range(index: isize, len: usize) -> Error {
    Error::IndexOutOfRange {
        index: index as i64,
        len,
    }
}

/// A remote list of `T` values.
pub struct List<T, S: RemoteStore + ?Sized = dyn RemoteStore> {
    handle: Handle<S>,
    _values: PhantomData<fn() -> T>,
}

impl<T, S> List<T, S>
where
    T: Serialize + DeserializeOwned,
    S: RemoteStore + ?Sized,
{
    pub fn open(store: Arc<S>, token: Option<Token>, codec: Codec) -> Result<Self> {
        Handle::open(store, token, Kind::List, codec).map(Self::from_handle)
    }

    pub(crate) fn from_handle(handle: Handle<S>) -> Self {
        Self {
            handle,
            _values: PhantomData,
        }
    }

    pub fn handle(&self) -> &Handle<S> {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut Handle<S> {
        &mut self.handle
    }

    pub fn token(&self) -> &Token {
        self.handle.token()
    }

    /// A second list on the same token.
    pub fn alias(&self) -> Self {
        Self::from_handle(self.handle.alias())
    }

    /// Deletes the whole list.
    pub fn clear(&self) -> Result<bool> {
        self.handle.destroy()
    }

    fn store(&self) -> &S {
        self.handle.store()
    }

    fn raw(&self) -> Result<Vec<Vec<u8>>> {
        self.store().range(self.token(), 0, -1)
    }

    fn push_raw(&self, end: End, values: Vec<Vec<u8>>) -> Result<usize> {
        if values.is_empty() {
            return self.len();
        }
        self.store().push(self.token(), end, values)
    }

    pub fn len(&self) -> Result<usize> {
        self.store().len(self.token())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.handle.decode_all(&self.raw()?)
    }

    // Positional access

    /// Value at `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<Option<T>> {
        let raw = self.store().index(self.token(), index as i64)?;
        self.handle.decode_opt(raw)
    }

    /// Values selected by a slice.
    ///
    /// The window is read in one store range call. A step is applied to
    /// the materialised window afterwards; a negative step walks it from
    /// the end.
    pub fn get_range(&self, slice: &Slice) -> Result<Vec<T>> {
        slice.step()?;
        let Some((start, stop)) = slice.store_bounds() else {
            return Ok(Vec::new());
        };
        let raw = self.store().range(self.token(), start, stop)?;
        self.handle.decode_all(&slice.pick(raw)?)
    }

    /// Overwrites the value at `index`. The store rejects out-of-range
    /// indices.
    pub fn set(&self, index: isize, value: &T) -> Result<()> {
        let encoded = self.handle.encode(value)?;
        self.store().set_at(self.token(), index as i64, encoded)
    }

    /// Positional "insert" that replaces the element in place instead of
    /// shifting. Same as [`List::set`].
    pub fn overwrite_at(&self, index: isize, value: &T) -> Result<()> {
        self.set(index, value)
    }

    /// Inserts before `index`, shifting later elements right.
    ///
    /// The index is clamped to `[0, len]`, so out-of-range positions insert
    /// at the nearest end.
    pub fn shift_insert_at(&self, index: isize, value: &T) -> Result<()> {
        let len = self.len()?;
        let signed = len as isize;
        let at = if index < 0 {
            (index + signed).max(0)
        } else {
            index.min(signed)
        } as usize;
        let encoded = self.handle.encode(value)?;
        let token = self.token();
        let store = self.store();

        if at == 0 {
            store.push(token, End::Head, vec![encoded])?;
        } else if at == len {
            store.push(token, End::Tail, vec![encoded])?;
        } else if at <= len / 2 {
            let segment = store.range(token, 0, at as i64 - 1)?;
            store.trim(token, at as i64, -1)?;
            let mut values = vec![encoded];
            values.extend(segment.into_iter().rev());
            store.push(token, End::Head, values)?;
        } else {
            let segment = store.range(token, at as i64, -1)?;
            store.trim(token, 0, at as i64 - 1)?;
            let mut values = vec![encoded];
            values.extend(segment);
            store.push(token, End::Tail, values)?;
        }
        Ok(())
    }

    // Deletion

    /// Removes the element at `index`, closing the gap.
    pub fn delete(&self, index: isize) -> Result<()> {
        let len = self.len()?;
        let at = resolve(index, len).ok_or_else(|| out_of_range(index, len))?;
        self.delete_resolved(at, len)
    }

    fn delete_resolved(&self, at: usize, len: usize) -> Result<()> {
        let token = self.token();
        let store = self.store();
        let at = at as i64;

        if at == 0 {
            return store.trim(token, 1, -1);
        }
        if at == len as i64 - 1 {
            return store.trim(token, 0, -2);
        }
        if at <= len as i64 / 2 {
            let segment = store.range(token, 0, at - 1)?;
            store.trim(token, at + 1, -1)?;
            store.push(token, End::Head, segment.into_iter().rev().collect())?;
        } else {
            let segment = store.range(token, at + 1, -1)?;
            store.trim(token, 0, at - 1)?;
            store.push(token, End::Tail, segment)?;
        }
        Ok(())
    }

    /// Removes every element selected by a slice.
    ///
    /// A unit step removes one contiguous run with a single splice. Any
    /// other step falls back to one positional delete per selected index,
    /// which costs a splice each.
    pub fn delete_range(&self, slice: &Slice) -> Result<()> {
        let step = slice.step()?;
        let len = self.len()?;
        if step != 1 {
            let mut positions = slice.positions(len)?;
            positions.sort_unstable();
            for (removed, at) in positions.into_iter().enumerate() {
                self.delete_resolved(at - removed, len - removed)?;
            }
            return Ok(());
        }

        let (start, stop, _) = slice.indices(len)?;
        if start >= stop {
            return Ok(());
        }
        let token = self.token();
        let store = self.store();

        if start == 0 && stop == len {
            store.delete(token)?;
        } else if start == 0 {
            store.trim(token, stop as i64, -1)?;
        } else if stop == len {
            store.trim(token, 0, start as i64 - 1)?;
        } else if start < len - stop {
            let segment = store.range(token, 0, start as i64 - 1)?;
            store.trim(token, stop as i64, -1)?;
            store.push(token, End::Head, segment.into_iter().rev().collect())?;
        } else {
            let segment = store.range(token, stop as i64, -1)?;
            store.trim(token, 0, start as i64 - 1)?;
            store.push(token, End::Tail, segment)?;
        }
        Ok(())
    }

    // Ends

    /// Appends at the tail. Returns the new length.
    pub fn push(&self, value: &T) -> Result<usize> {
        let encoded = self.handle.encode(value)?;
        self.store().push(self.token(), End::Tail, vec![encoded])
    }

    /// Prepends at the head. Returns the new length.
    pub fn push_front(&self, value: &T) -> Result<usize> {
        let encoded = self.handle.encode(value)?;
        self.store().push(self.token(), End::Head, vec![encoded])
    }

    /// Appends every value at the tail, in order.
    pub fn extend<'a, I>(&self, values: I) -> Result<usize>
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let encoded = self.handle.encode_all(values)?;
        self.push_raw(End::Tail, encoded)
    }

    pub fn pop(&self, end: End) -> Result<Option<T>> {
        let raw = self.store().pop(self.token(), end)?;
        self.handle.decode_opt(raw)
    }

    /// Removes and returns the element at `index`, or `None` when the index
    /// is out of range.
    pub fn pop_at(&self, index: isize) -> Result<Option<T>> {
        let len = self.len()?;
        let Some(at) = resolve(index, len) else {
            return Ok(None);
        };
        if at == 0 {
            return self.pop(End::Head);
        }
        if at == len - 1 {
            return self.pop(End::Tail);
        }
        let raw = self.store().index(self.token(), at as i64)?;
        self.delete_resolved(at, len)?;
        self.handle.decode_opt(raw)
    }

    /// Removes and returns the elements selected by a slice.
    pub fn pop_range(&self, slice: &Slice) -> Result<Vec<T>> {
        let values = self.get_range(slice)?;
        self.delete_range(slice)?;
        Ok(values)
    }

    // Search

    pub fn contains(&self, value: &T) -> Result<bool> {
        let encoded = self.handle.encode(value)?;
        Ok(self.store().position(self.token(), &encoded)?.is_some())
    }

    /// Number of elements equal to `value`.
    pub fn count(&self, value: &T) -> Result<usize> {
        let encoded = self.handle.encode(value)?;
        Ok(self.raw()?.iter().filter(|item| **item == encoded).count())
    }

    /// Position of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Result<usize> {
        let encoded = self.handle.encode(value)?;
        self.store()
            .position(self.token(), &encoded)?
            .ok_or(Error::ValueNotFound)
    }

    /// Removes every element equal to `value`. Returns how many went.
    pub fn remove(&self, value: &T) -> Result<usize> {
        let encoded = self.handle.encode(value)?;
        self.store().remove_equal(self.token(), &encoded)
    }

    // Whole-list rewrites

    pub fn reverse(&self) -> Result<()> {
        let mut raw = self.raw()?;
        raw.reverse();
        self.clear()?;
        self.push_raw(End::Tail, raw)?;
        Ok(())
    }

    pub fn sort(&self) -> Result<()>
    where
        T: Ord,
    {
        let mut values = self.to_vec()?;
        values.sort();
        let encoded = self.handle.encode_all(&values)?;
        self.clear()?;
        self.push_raw(End::Tail, encoded)?;
        Ok(())
    }

    /// Repeats the contents `times` times in place. Zero clears the list.
    pub fn repeat(&self, times: usize) -> Result<()> {
        if times == 0 {
            self.clear()?;
            return Ok(());
        }
        let raw = self.raw()?;
        let extra: Vec<Vec<u8>> = raw
            .iter()
            .cycle()
            .take(raw.len() * (times - 1))
            .cloned()
            .collect();
        self.push_raw(End::Tail, extra)?;
        Ok(())
    }

    /// Moves the tail element onto the head of `target`, or of this list
    /// when `target` is `None`, and returns it.
    pub fn circulate(&self, target: Option<&Token>) -> Result<Option<T>> {
        let target = target.unwrap_or(self.token());
        let raw = self.store().pop_push(self.token(), target, End::Tail)?;
        self.handle.decode_opt(raw)
    }
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
