// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking queues that consume from several channels at once.
//!
//! A channel is a remote list. A consumer names its own channel first and
//! any number of auxiliary channels after it; when more than one holds
//! data, the earliest listed channel is served. Each call stands alone:
//! nothing about the consumer outlives it.

use std::sync::Arc;

use remcol_core::{Codec, End, RemoteStore, Result, Timeout, Token};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::sequence::List;

/// How a pop waits and which end it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopOptions {
    /// Wait for an item instead of returning immediately.
    pub block: bool,
    /// Upper bound on the wait when blocking; `0` waits forever.
    pub timeout: Timeout,
    /// `Tail` consumes in arrival order against [`Queue::put`].
    pub end: End,
}

impl Default for PopOptions {
    fn default() -> Self {
        Self {
            block: true,
            timeout: Timeout::FOREVER,
            end: End::Tail,
        }
    }
}

impl PopOptions {
    pub fn blocking(timeout: Timeout) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn non_blocking() -> Self {
        Self {
            block: false,
            ..Self::default()
        }
    }

    pub fn from_end(self, end: End) -> Self {
        Self { end, ..self }
    }
}

/// Result of one pop or circulate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// An item, with the channel it was taken from.
    Delivered { channel: Token, value: T },
    /// A blocking call waited out its timeout.
    TimedOut,
    /// A non-blocking call found every channel empty.
    Empty,
}

impl<T> Outcome<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Delivered { value, .. } => Some(value),
            Outcome::TimedOut | Outcome::Empty => None,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Delivered { .. } => "delivered",
            Outcome::TimedOut => "timed_out",
            Outcome::Empty => "empty",
        }
    }
}

/// A queue over a remote list: producers put at the head, consumers take
/// from the tail.
pub struct Queue<T, S: RemoteStore + ?Sized = dyn RemoteStore> {
    list: List<T, S>,
}

impl<T, S> Queue<T, S>
where
    T: Serialize + DeserializeOwned,
    S: RemoteStore + ?Sized,
{
    pub fn open(store: Arc<S>, token: Option<Token>, codec: Codec) -> Result<Self> {
        List::open(store, token, codec).map(|list| Self { list })
    }

    /// The underlying list, for positional access.
    pub fn list(&self) -> &List<T, S> {
        &self.list
    }

    pub fn token(&self) -> &Token {
        self.list.token()
    }

    /// Enqueues at the head.
    pub fn put(&self, value: &T) -> Result<usize> {
        self.list.push_front(value)
    }

    /// Enqueues at the tail, ahead of everything already waiting.
    pub fn put_tail(&self, value: &T) -> Result<usize> {
        self.list.push(value)
    }

    /// Takes one item from this queue's channel or, failing that, from the
    /// first non-empty auxiliary channel in the order given.
    pub fn pop(&self, aux: &[Token], options: PopOptions) -> Result<Outcome<T>> {
        let mut channels = Vec::with_capacity(aux.len() + 1);
        channels.push(self.token().clone());
        channels.extend(aux.iter().cloned());

        let store = self.list.handle().store();
        let found = if options.block {
            store.blocking_pop(&channels, options.end, options.timeout)?
        } else {
            let mut found = None;
            for channel in channels {
                if let Some(raw) = store.pop(&channel, options.end)? {
                    found = Some((channel, raw));
                    break;
                }
            }
            found
        };

        let outcome = match found {
            Some((channel, raw)) => Outcome::Delivered {
                channel,
                value: self.list.handle().decode(&raw)?,
            },
            None if options.block => Outcome::TimedOut,
            None => Outcome::Empty,
        };
        tracing::debug!(
            token = %self.token(),
            channels = aux.len() + 1,
            block = options.block,
            timeout = %options.timeout,
            outcome = outcome.label(),
            "queue pop"
        );
        Ok(outcome)
    }

    /// Takes one item from this queue's own channel.
    pub fn get(&self, block: bool, timeout: Timeout) -> Result<Outcome<T>> {
        self.pop(
            &[],
            PopOptions {
                block,
                timeout,
                end: End::Tail,
            },
        )
    }

    /// Atomically moves one item from `options.end` of this queue onto the
    /// opposite end of `target` (this queue when `None`) and returns it.
    pub fn circulate(&self, target: Option<&Token>, options: PopOptions) -> Result<Outcome<T>> {
        let source = self.token();
        let target = target.unwrap_or(source);
        let store = self.list.handle().store();
        let moved = if options.block {
            store.blocking_pop_push(source, target, options.end, options.timeout)?
        } else {
            store.pop_push(source, target, options.end)?
        };
        let outcome = match moved {
            Some(raw) => Outcome::Delivered {
                channel: source.clone(),
                value: self.list.handle().decode(&raw)?,
            },
            None if options.block => Outcome::TimedOut,
            None => Outcome::Empty,
        };
        tracing::debug!(
            token = %source,
            target = %target,
            block = options.block,
            outcome = outcome.label(),
            "queue circulate"
        );
        Ok(outcome)
    }

    pub fn len(&self) -> Result<usize> {
        self.list.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.list.is_empty()
    }

    /// Remote queues are unbounded.
    pub fn is_full(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
