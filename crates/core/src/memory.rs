// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process implementation of [`RemoteStore`].
//!
//! The whole keyspace sits behind one mutex, so every primitive is atomic
//! with respect to every other. Blocked pops park on a condition variable
//! that pushes and moves signal.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::hll::Sketch;
use crate::store::{End, RemoteStore, SetOp, Timeout};
use crate::token::{Kind, Token};

/// How often a watched blocking wait re-checks its caller.
const WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Counters describing the traffic a store has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Commands executed.
    pub commands: u64,
    /// Elements returned to callers by reads and pops.
    pub elements_sent: u64,
    /// Elements written by callers.
    pub elements_received: u64,
}

enum Value {
    List(VecDeque<Vec<u8>>),
    Hash(BTreeMap<Vec<u8>, Vec<u8>>),
    Set(BTreeSet<Vec<u8>>),
    String(Vec<u8>),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::List(_) => Kind::List,
            Value::Hash(_) => Kind::Hash,
            Value::Set(_) => Kind::Set,
            Value::String(_) => Kind::String,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Hash(fields) => fields.is_empty(),
            Value::Set(members) => members.is_empty(),
            Value::String(_) => false,
        }
    }
}

#[derive(Default)]
struct Keyspace {
    entries: HashMap<Token, Value>,
    closed: bool,
}

fn wrong_type(token: &Token, expected: Kind, found: Kind) -> Error {
    Error::WrongType {
        token: token.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Store("keyspace lock poisoned".to_string())
}

/// Resolves an inclusive store range against a length.
///
/// Returns `None` when the range selects nothing.
fn clamp_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let n = len as i64;
    let mut start = if start < 0 { start + n } else { start };
    let mut stop = if stop < 0 { stop + n } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= n {
        stop = n - 1;
    }
    if start > stop || start >= n {
        return None;
    }
    Some((start as usize, stop as usize))
}

macro_rules! accessors {
    ($get:ident, $get_mut:ident, $create:ident, $variant:ident, $kind:expr, $ty:ty) => {
        fn $get(&self, token: &Token) -> Result<Option<&$ty>> {
            match self.entries.get(token) {
                None => Ok(None),
                Some(Value::$variant(inner)) => Ok(Some(inner)),
                Some(other) => Err(wrong_type(token, $kind, other.kind())),
            }
        }

        fn $get_mut(&mut self, token: &Token) -> Result<Option<&mut $ty>> {
            match self.entries.get_mut(token) {
                None => Ok(None),
                Some(Value::$variant(inner)) => Ok(Some(inner)),
                Some(other) => Err(wrong_type(token, $kind, other.kind())),
            }
        }

        fn $create(&mut self, token: &Token) -> Result<&mut $ty> {
            let value = self
                .entries
                .entry(token.clone())
                .or_insert_with(|| Value::$variant(Default::default()));
            match value {
                Value::$variant(inner) => Ok(inner),
                other => Err(wrong_type(token, $kind, other.kind())),
            }
        }
    };
}

impl Keyspace {
    accessors!(list, list_mut, list_or_create, List, Kind::List, VecDeque<Vec<u8>>);
    accessors!(hash, hash_mut, hash_or_create, Hash, Kind::Hash, BTreeMap<Vec<u8>, Vec<u8>>);
    accessors!(set, set_mut, set_or_create, Set, Kind::Set, BTreeSet<Vec<u8>>);

    /// Drops the entry if the last element was removed from it.
    fn prune(&mut self, token: &Token) {
        if self.entries.get(token).is_some_and(Value::is_empty) {
            self.entries.remove(token);
        }
    }

    fn pop(&mut self, token: &Token, end: End) -> Result<Option<Vec<u8>>> {
        let popped = match self.list_mut(token)? {
            None => None,
            Some(items) => match end {
                End::Head => items.pop_front(),
                End::Tail => items.pop_back(),
            },
        };
        self.prune(token);
        Ok(popped)
    }

    fn push(&mut self, token: &Token, end: End, values: Vec<Vec<u8>>) -> Result<usize> {
        if values.is_empty() {
            return Ok(self.list(token)?.map_or(0, VecDeque::len));
        }
        let items = self.list_or_create(token)?;
        for value in values {
            match end {
                End::Head => items.push_front(value),
                End::Tail => items.push_back(value),
            }
        }
        Ok(items.len())
    }

    fn pop_push(&mut self, source: &Token, dest: &Token, end: End) -> Result<Option<Vec<u8>>> {
        // Fail on a mistyped destination before anything leaves the source.
        self.list(dest)?;
        let Some(value) = self.pop(source, end)? else {
            return Ok(None);
        };
        self.push(dest, end.opposite(), vec![value.clone()])?;
        Ok(Some(value))
    }

    fn sketch(&self, token: &Token) -> Result<Option<Sketch>> {
        match self.entries.get(token) {
            None => Ok(None),
            Some(Value::String(bytes)) => match Sketch::from_bytes(bytes) {
                Some(sketch) => Ok(Some(sketch)),
                None => Err(Error::WrongType {
                    token: token.to_string(),
                    expected: "cardinality sketch".to_string(),
                    found: Kind::String.to_string(),
                }),
            },
            Some(other) => Err(wrong_type(token, Kind::String, other.kind())),
        }
    }

    fn combine(&self, op: SetOp, tokens: &[Token]) -> Result<BTreeSet<Vec<u8>>> {
        let mut sets = Vec::with_capacity(tokens.len());
        for token in tokens {
            sets.push(self.set(token)?.cloned().unwrap_or_default());
        }
        let mut iter = sets.into_iter();
        let Some(first) = iter.next() else {
            return Ok(BTreeSet::new());
        };
        Ok(iter.fold(first, |acc, next| match op {
            SetOp::Union => acc.union(&next).cloned().collect(),
            SetOp::Intersection => acc.intersection(&next).cloned().collect(),
            SetOp::Difference => acc.difference(&next).cloned().collect(),
        }))
    }
}

/// A [`RemoteStore`] living entirely in this process.
///
/// Used as the backing store of the `remcold` daemon and directly by tests.
#[derive(Default)]
pub struct MemoryStore {
    keyspace: Mutex<Keyspace>,
    ready: Condvar,
    commands: AtomicU64,
    elements_sent: AtomicU64,
    elements_received: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the traffic counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            commands: self.commands.load(Ordering::Relaxed),
            elements_sent: self.elements_sent.load(Ordering::Relaxed),
            elements_received: self.elements_received.load(Ordering::Relaxed),
        }
    }

    /// Number of tokens currently holding an entry.
    pub fn key_count(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }

    /// Closes the store. Blocked pops wake with [`Error::Closed`] and every
    /// later command fails the same way.
    pub fn close(&self) {
        let mut keyspace = self.keyspace.lock().unwrap_or_else(PoisonError::into_inner);
        keyspace.closed = true;
        drop(keyspace);
        self.ready.notify_all();
    }

    fn lock(&self) -> Result<MutexGuard<'_, Keyspace>> {
        self.commands.fetch_add(1, Ordering::Relaxed);
        let keyspace = self.keyspace.lock().map_err(poisoned)?;
        if keyspace.closed {
            return Err(Error::Closed);
        }
        Ok(keyspace)
    }

    fn sent(&self, n: usize) {
        self.elements_sent.fetch_add(n as u64, Ordering::Relaxed);
    }

    fn received(&self, n: usize) {
        self.elements_received.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Waits on the condition variable until `attempt` yields a value, the
    /// deadline passes, or the store closes.
    ///
    /// With `waiting`, the wait wakes every [`WATCH_INTERVAL`] and gives up
    /// without taking anything once `waiting` returns false. A deadline
    /// too far out to represent waits forever.
    fn wait_for<T>(
        &self,
        timeout: Timeout,
        waiting: Option<&dyn Fn() -> bool>,
        mut attempt: impl FnMut(&mut Keyspace) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let deadline = if timeout.is_forever() {
            None
        } else {
            Instant::now().checked_add(Duration::from_secs(timeout.secs()))
        };
        let mut keyspace = self.lock()?;
        loop {
            if keyspace.closed {
                return Err(Error::Closed);
            }
            if let Some(waiting) = waiting {
                if !waiting() {
                    return Ok(None);
                }
            }
            if let Some(found) = attempt(&mut *keyspace)? {
                return Ok(Some(found));
            }
            let now = Instant::now();
            let remaining = match deadline {
                Some(deadline) if now >= deadline => return Ok(None),
                Some(deadline) => Some(deadline - now),
                None => None,
            };
            let slice = match (remaining, waiting.is_some()) {
                (Some(remaining), true) => Some(remaining.min(WATCH_INTERVAL)),
                (None, true) => Some(WATCH_INTERVAL),
                (remaining, false) => remaining,
            };
            keyspace = match slice {
                None => self.ready.wait(keyspace).map_err(poisoned)?,
                Some(slice) => self.ready.wait_timeout(keyspace, slice).map_err(poisoned)?.0,
            };
        }
    }

    /// [`RemoteStore::blocking_pop`] that also stops waiting, without
    /// popping, as soon as `waiting` returns false.
    pub fn blocking_pop_while(
        &self,
        tokens: &[Token],
        end: End,
        timeout: Timeout,
        waiting: &dyn Fn() -> bool,
    ) -> Result<Option<(Token, Vec<u8>)>> {
        self.pop_first(tokens, end, timeout, Some(waiting))
    }

    /// [`RemoteStore::blocking_pop_push`] that also stops waiting, without
    /// moving, as soon as `waiting` returns false.
    pub fn blocking_pop_push_while(
        &self,
        source: &Token,
        dest: &Token,
        end: End,
        timeout: Timeout,
        waiting: &dyn Fn() -> bool,
    ) -> Result<Option<Vec<u8>>> {
        self.move_first(source, dest, end, timeout, Some(waiting))
    }

    fn pop_first(
        &self,
        tokens: &[Token],
        end: End,
        timeout: Timeout,
        waiting: Option<&dyn Fn() -> bool>,
    ) -> Result<Option<(Token, Vec<u8>)>> {
        let popped = self.wait_for(timeout, waiting, |keyspace| {
            for token in tokens {
                if let Some(value) = keyspace.pop(token, end)? {
                    return Ok(Some((token.clone(), value)));
                }
            }
            Ok(None)
        })?;
        if popped.is_some() {
            self.sent(1);
        }
        Ok(popped)
    }

    fn move_first(
        &self,
        source: &Token,
        dest: &Token,
        end: End,
        timeout: Timeout,
        waiting: Option<&dyn Fn() -> bool>,
    ) -> Result<Option<Vec<u8>>> {
        let moved = self.wait_for(timeout, waiting, |keyspace| {
            keyspace.pop_push(source, dest, end)
        })?;
        if moved.is_some() {
            self.sent(1);
            self.ready.notify_all();
        }
        Ok(moved)
    }
}

impl RemoteStore for MemoryStore {
    fn type_of(&self, token: &Token) -> Result<Option<Kind>> {
        Ok(self.lock()?.entries.get(token).map(Value::kind))
    }

    fn delete(&self, token: &Token) -> Result<bool> {
        Ok(self.lock()?.entries.remove(token).is_some())
    }

    fn range(&self, token: &Token, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let keyspace = self.lock()?;
        let Some(items) = keyspace.list(token)? else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = clamp_range(items.len(), start, stop) else {
            return Ok(Vec::new());
        };
        let out: Vec<Vec<u8>> = items.range(start..=stop).cloned().collect();
        self.sent(out.len());
        Ok(out)
    }

    fn trim(&self, token: &Token, start: i64, stop: i64) -> Result<()> {
        let mut keyspace = self.lock()?;
        let Some(items) = keyspace.list_mut(token)? else {
            return Ok(());
        };
        match clamp_range(items.len(), start, stop) {
            Some((start, stop)) => {
                items.truncate(stop + 1);
                items.drain(..start);
            }
            None => items.clear(),
        }
        keyspace.prune(token);
        Ok(())
    }

    fn push(&self, token: &Token, end: End, values: Vec<Vec<u8>>) -> Result<usize> {
        let count = values.len();
        let len = self.lock()?.push(token, end, values)?;
        self.received(count);
        if count > 0 {
            self.ready.notify_all();
        }
        Ok(len)
    }

    fn pop(&self, token: &Token, end: End) -> Result<Option<Vec<u8>>> {
        let popped = self.lock()?.pop(token, end)?;
        if popped.is_some() {
            self.sent(1);
        }
        Ok(popped)
    }

    fn blocking_pop(
        &self,
        tokens: &[Token],
        end: End,
        timeout: Timeout,
    ) -> Result<Option<(Token, Vec<u8>)>> {
        self.pop_first(tokens, end, timeout, None)
    }

    fn pop_push(&self, source: &Token, dest: &Token, end: End) -> Result<Option<Vec<u8>>> {
        let moved = self.lock()?.pop_push(source, dest, end)?;
        if moved.is_some() {
            self.sent(1);
            self.ready.notify_all();
        }
        Ok(moved)
    }

    fn blocking_pop_push(
        &self,
        source: &Token,
        dest: &Token,
        end: End,
        timeout: Timeout,
    ) -> Result<Option<Vec<u8>>> {
        self.move_first(source, dest, end, timeout, None)
    }

    fn len(&self, token: &Token) -> Result<usize> {
        Ok(self.lock()?.list(token)?.map_or(0, VecDeque::len))
    }

    fn index(&self, token: &Token, index: i64) -> Result<Option<Vec<u8>>> {
        let keyspace = self.lock()?;
        let Some(items) = keyspace.list(token)? else {
            return Ok(None);
        };
        let n = items.len() as i64;
        let resolved = if index < 0 { index + n } else { index };
        if resolved < 0 || resolved >= n {
            return Ok(None);
        }
        let value = items.get(resolved as usize).cloned();
        if value.is_some() {
            self.sent(1);
        }
        Ok(value)
    }

    fn set_at(&self, token: &Token, index: i64, value: Vec<u8>) -> Result<()> {
        let mut keyspace = self.lock()?;
        let Some(items) = keyspace.list_mut(token)? else {
            return Err(Error::NoSuchKey(token.to_string()));
        };
        let len = items.len();
        let n = len as i64;
        let resolved = if index < 0 { index + n } else { index };
        if resolved < 0 || resolved >= n {
            return Err(Error::IndexOutOfRange { index, len });
        }
        items[resolved as usize] = value;
        self.received(1);
        Ok(())
    }

    fn position(&self, token: &Token, value: &[u8]) -> Result<Option<usize>> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .list(token)?
            .and_then(|items| items.iter().position(|item| item == value)))
    }

    fn remove_equal(&self, token: &Token, value: &[u8]) -> Result<usize> {
        let mut keyspace = self.lock()?;
        let Some(items) = keyspace.list_mut(token)? else {
            return Ok(0);
        };
        let before = items.len();
        items.retain(|item| item != value);
        let removed = before - items.len();
        keyspace.prune(token);
        Ok(removed)
    }

    fn hash_get(&self, token: &Token, field: &[u8]) -> Result<Option<Vec<u8>>> {
        let keyspace = self.lock()?;
        let value = keyspace
            .hash(token)?
            .and_then(|fields| fields.get(field).cloned());
        if value.is_some() {
            self.sent(1);
        }
        Ok(value)
    }

    fn hash_set(&self, token: &Token, field: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        let created = self
            .lock()?
            .hash_or_create(token)?
            .insert(field, value)
            .is_none();
        self.received(1);
        Ok(created)
    }

    fn hash_delete(&self, token: &Token, fields: &[Vec<u8>]) -> Result<usize> {
        let mut keyspace = self.lock()?;
        let Some(map) = keyspace.hash_mut(token)? else {
            return Ok(0);
        };
        let removed = fields
            .iter()
            .filter(|field| map.remove(field.as_slice()).is_some())
            .count();
        keyspace.prune(token);
        Ok(removed)
    }

    fn hash_exists(&self, token: &Token, field: &[u8]) -> Result<bool> {
        Ok(self
            .lock()?
            .hash(token)?
            .is_some_and(|fields| fields.contains_key(field)))
    }

    fn hash_len(&self, token: &Token) -> Result<usize> {
        Ok(self.lock()?.hash(token)?.map_or(0, BTreeMap::len))
    }

    fn hash_keys(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        let keys: Vec<Vec<u8>> = self
            .lock()?
            .hash(token)?
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();
        self.sent(keys.len());
        Ok(keys)
    }

    fn hash_values(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        let values: Vec<Vec<u8>> = self
            .lock()?
            .hash(token)?
            .map(|fields| fields.values().cloned().collect())
            .unwrap_or_default();
        self.sent(values.len());
        Ok(values)
    }

    fn hash_entries(&self, token: &Token) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .lock()?
            .hash(token)?
            .map(|fields| fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        self.sent(entries.len());
        Ok(entries)
    }

    fn set_add(&self, token: &Token, members: Vec<Vec<u8>>) -> Result<usize> {
        let count = members.len();
        let mut keyspace = self.lock()?;
        if members.is_empty() {
            keyspace.set(token)?;
            return Ok(0);
        }
        let set = keyspace.set_or_create(token)?;
        let added = members.into_iter().filter(|m| set.insert(m.clone())).count();
        self.received(count);
        Ok(added)
    }

    fn set_remove(&self, token: &Token, members: &[Vec<u8>]) -> Result<usize> {
        let mut keyspace = self.lock()?;
        let Some(set) = keyspace.set_mut(token)? else {
            return Ok(0);
        };
        let removed = members.iter().filter(|m| set.remove(m.as_slice())).count();
        keyspace.prune(token);
        Ok(removed)
    }

    fn set_contains(&self, token: &Token, member: &[u8]) -> Result<bool> {
        Ok(self
            .lock()?
            .set(token)?
            .is_some_and(|set| set.contains(member)))
    }

    fn set_len(&self, token: &Token) -> Result<usize> {
        Ok(self.lock()?.set(token)?.map_or(0, BTreeSet::len))
    }

    fn set_members(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        let members: Vec<Vec<u8>> = self
            .lock()?
            .set(token)?
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        self.sent(members.len());
        Ok(members)
    }

    fn set_pop(&self, token: &Token) -> Result<Option<Vec<u8>>> {
        let mut keyspace = self.lock()?;
        let popped = keyspace.set_mut(token)?.and_then(BTreeSet::pop_first);
        keyspace.prune(token);
        if popped.is_some() {
            self.sent(1);
        }
        Ok(popped)
    }

    fn set_combine(&self, op: SetOp, tokens: &[Token]) -> Result<Vec<Vec<u8>>> {
        let combined: Vec<Vec<u8>> = self.lock()?.combine(op, tokens)?.into_iter().collect();
        self.sent(combined.len());
        Ok(combined)
    }

    fn set_combine_store(&self, op: SetOp, dest: &Token, tokens: &[Token]) -> Result<usize> {
        let mut keyspace = self.lock()?;
        let combined = keyspace.combine(op, tokens)?;
        let len = combined.len();
        keyspace.entries.remove(dest);
        if len > 0 {
            keyspace.entries.insert(dest.clone(), Value::Set(combined));
        }
        Ok(len)
    }

    fn counter_add(&self, token: &Token, values: Vec<Vec<u8>>) -> Result<bool> {
        let count = values.len();
        let mut keyspace = self.lock()?;
        let existing = keyspace.sketch(token)?;
        let created = existing.is_none();
        let mut sketch = existing.unwrap_or_default();
        let mut changed = false;
        for value in &values {
            changed |= sketch.insert(value);
        }
        if created || changed {
            keyspace
                .entries
                .insert(token.clone(), Value::String(sketch.to_bytes()));
        }
        self.received(count);
        Ok(created || changed)
    }

    fn counter_count(&self, tokens: &[Token]) -> Result<u64> {
        let keyspace = self.lock()?;
        let mut merged = Sketch::new();
        for token in tokens {
            if let Some(sketch) = keyspace.sketch(token)? {
                merged.merge(&sketch);
            }
        }
        Ok(merged.estimate())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
