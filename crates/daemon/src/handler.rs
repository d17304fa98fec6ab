// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch.

use std::time::Instant;

use remcol_core::{End, Error, MemoryStore, RemoteStore, Result, Token};
use remcol_ipc::{
    tokens_from_wire, values_from_wire, Bytes, DaemonRequest, DaemonResponse, DaemonStatus,
    ErrorCode, Reply, StoreOp,
};

/// Shared state every connection handler reads.
pub struct Context {
    pub store: MemoryStore,
    pub started: Instant,
}

impl Context {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            started: Instant::now(),
        }
    }
}

/// Answers one request. `Shutdown` only acknowledges; the server loop
/// acts on it.
pub fn handle_request(request: DaemonRequest, ctx: &Context) -> DaemonResponse {
    serve_request(request, ctx, &|| true)
}

/// Like [`handle_request`], with blocking pops abandoned as soon as
/// `connected` reports the client gone.
pub fn serve_request(
    request: DaemonRequest,
    ctx: &Context,
    connected: &dyn Fn() -> bool,
) -> DaemonResponse {
    match request {
        DaemonRequest::Ping => DaemonResponse::Pong,
        DaemonRequest::Status => {
            let pid = std::process::id();
            let uptime_secs = ctx.started.elapsed().as_secs();
            match ctx.store.key_count() {
                Ok(keys) => DaemonResponse::Status(DaemonStatus::new(pid, uptime_secs, keys)),
                Err(e) => error_response(&e),
            }
        }
        DaemonRequest::Shutdown => DaemonResponse::ShuttingDown,
        DaemonRequest::Hello { version } => {
            tracing::debug!(client = %version, "hello");
            DaemonResponse::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }
        }
        DaemonRequest::Store(op) => {
            let name = op.name();
            match apply_watched(&ctx.store, op, connected) {
                Ok(reply) => {
                    tracing::debug!(op = name, result = reply.name(), "store command");
                    DaemonResponse::Reply(reply)
                }
                Err(e) => {
                    tracing::debug!(op = name, error = %e, "store command failed");
                    error_response(&e)
                }
            }
        }
    }
}

fn error_response(err: &Error) -> DaemonResponse {
    let code = ErrorCode::classify(err);
    if code == ErrorCode::Internal {
        tracing::warn!("store error: {}", err);
    }
    DaemonResponse::Error {
        code,
        message: err.to_string(),
    }
}

/// Runs blocking pops on the daemon's store so they stop waiting once the
/// client hangs up; everything else goes through [`apply`].
fn apply_watched(store: &MemoryStore, op: StoreOp, connected: &dyn Fn() -> bool) -> Result<Reply> {
    match op {
        StoreOp::BlockingPop {
            tokens,
            end,
            timeout,
        } => {
            let popped =
                store.blocking_pop_while(&tokens_from_wire(tokens), end, timeout, connected)?;
            Ok(Reply::Delivered {
                delivered: popped.map(|(token, value)| (Bytes::from(&token), Bytes(value))),
            })
        }
        StoreOp::BlockingPopPush {
            source,
            dest,
            end,
            timeout,
        } => Ok(Reply::value(store.blocking_pop_push_while(
            &source.into_token(),
            &dest.into_token(),
            end,
            timeout,
            connected,
        )?)),
        op => apply(store, op),
    }
}

/// The end a pop request takes from, kept so an element whose reply
/// never reached the client can be put back.
#[derive(Debug, Clone, PartialEq)]
pub struct PopOrigin {
    end: End,
    token: Option<Token>,
}

impl PopOrigin {
    pub fn of(request: &DaemonRequest) -> Option<PopOrigin> {
        match request {
            DaemonRequest::Store(StoreOp::Pop { token, end }) => Some(PopOrigin {
                end: *end,
                token: Some(token.clone().into_token()),
            }),
            DaemonRequest::Store(StoreOp::BlockingPop { end, .. }) => Some(PopOrigin {
                end: *end,
                token: None,
            }),
            _ => None,
        }
    }

    /// Pushes the element carried by an undelivered `response` back onto
    /// the end it was popped from. Returns whether anything was restored.
    pub fn restore(&self, store: &dyn RemoteStore, response: &DaemonResponse) -> Result<bool> {
        let (token, value) = match (response, &self.token) {
            (DaemonResponse::Reply(Reply::Value { value: Some(value) }), Some(token)) => {
                (token.clone(), value.0.clone())
            }
            (
                DaemonResponse::Reply(Reply::Delivered {
                    delivered: Some((channel, value)),
                }),
                None,
            ) => (channel.clone().into_token(), value.0.clone()),
            _ => return Ok(false),
        };
        store.push(&token, self.end, vec![value])?;
        Ok(true)
    }
}

/// Runs one wire command against a store.
pub fn apply(store: &dyn RemoteStore, op: StoreOp) -> Result<Reply> {
    let reply = match op {
        StoreOp::TypeOf { token } => Reply::Kind {
            kind: store.type_of(&token.into_token())?,
        },
        StoreOp::Delete { token } => Reply::Bool {
            value: store.delete(&token.into_token())?,
        },
        StoreOp::Range { token, start, stop } => {
            Reply::values(store.range(&token.into_token(), start, stop)?)
        }
        StoreOp::Trim { token, start, stop } => {
            store.trim(&token.into_token(), start, stop)?;
            Reply::Done
        }
        StoreOp::Push { token, end, values } => {
            Reply::count(store.push(&token.into_token(), end, values_from_wire(values))?)
        }
        StoreOp::Pop { token, end } => Reply::value(store.pop(&token.into_token(), end)?),
        StoreOp::BlockingPop {
            tokens,
            end,
            timeout,
        } => {
            let popped = store.blocking_pop(&tokens_from_wire(tokens), end, timeout)?;
            Reply::Delivered {
                delivered: popped.map(|(token, value)| (Bytes::from(&token), Bytes(value))),
            }
        }
        StoreOp::PopPush { source, dest, end } => Reply::value(store.pop_push(
            &source.into_token(),
            &dest.into_token(),
            end,
        )?),
        StoreOp::BlockingPopPush {
            source,
            dest,
            end,
            timeout,
        } => Reply::value(store.blocking_pop_push(
            &source.into_token(),
            &dest.into_token(),
            end,
            timeout,
        )?),
        StoreOp::Len { token } => Reply::count(store.len(&token.into_token())?),
        StoreOp::Index { token, index } => Reply::value(store.index(&token.into_token(), index)?),
        StoreOp::SetAt {
            token,
            index,
            value,
        } => {
            store.set_at(&token.into_token(), index, value.into_vec())?;
            Reply::Done
        }
        StoreOp::Position { token, value } => Reply::Position {
            position: store
                .position(&token.into_token(), &value.0)?
                .map(|p| p as u64),
        },
        StoreOp::RemoveEqual { token, value } => {
            Reply::count(store.remove_equal(&token.into_token(), &value.0)?)
        }
        StoreOp::HashGet { token, field } => {
            Reply::value(store.hash_get(&token.into_token(), &field.0)?)
        }
        StoreOp::HashSet {
            token,
            field,
            value,
        } => Reply::Bool {
            value: store.hash_set(&token.into_token(), field.into_vec(), value.into_vec())?,
        },
        StoreOp::HashDelete { token, fields } => Reply::count(
            store.hash_delete(&token.into_token(), &values_from_wire(fields))?,
        ),
        StoreOp::HashExists { token, field } => Reply::Bool {
            value: store.hash_exists(&token.into_token(), &field.0)?,
        },
        StoreOp::HashLen { token } => Reply::count(store.hash_len(&token.into_token())?),
        StoreOp::HashKeys { token } => Reply::values(store.hash_keys(&token.into_token())?),
        StoreOp::HashValues { token } => Reply::values(store.hash_values(&token.into_token())?),
        StoreOp::HashEntries { token } => Reply::Entries {
            entries: store
                .hash_entries(&token.into_token())?
                .into_iter()
                .map(|(field, value)| (Bytes(field), Bytes(value)))
                .collect(),
        },
        StoreOp::SetAdd { token, members } => {
            Reply::count(store.set_add(&token.into_token(), values_from_wire(members))?)
        }
        StoreOp::SetRemove { token, members } => Reply::count(
            store.set_remove(&token.into_token(), &values_from_wire(members))?,
        ),
        StoreOp::SetContains { token, member } => Reply::Bool {
            value: store.set_contains(&token.into_token(), &member.0)?,
        },
        StoreOp::SetLen { token } => Reply::count(store.set_len(&token.into_token())?),
        StoreOp::SetMembers { token } => Reply::values(store.set_members(&token.into_token())?),
        StoreOp::SetPop { token } => Reply::value(store.set_pop(&token.into_token())?),
        StoreOp::SetCombine { set_op, tokens } => {
            Reply::values(store.set_combine(set_op, &tokens_from_wire(tokens))?)
        }
        StoreOp::SetCombineStore {
            set_op,
            dest,
            tokens,
        } => Reply::count(store.set_combine_store(
            set_op,
            &dest.into_token(),
            &tokens_from_wire(tokens),
        )?),
        StoreOp::CounterAdd { token, values } => Reply::Bool {
            value: store.counter_add(&token.into_token(), values_from_wire(values))?,
        },
        StoreOp::CounterCount { tokens } => Reply::Count {
            count: store.counter_count(&tokens_from_wire(tokens))?,
        },
    };
    Ok(reply)
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
