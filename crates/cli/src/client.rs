// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client for the remcold daemon.
//!
//! [`DaemonClient`] implements [`RemoteStore`] by sending each primitive as
//! one request over a persistent Unix socket connection.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use remcol_core::{End, Error, Kind, RemoteStore, Result, SetOp, Timeout, Token};
use remcol_ipc::{
    framing, tokens_to_wire, values_from_wire, values_to_wire, Bytes, DaemonRequest,
    DaemonResponse, DaemonStatus, Reply, StoreOp,
};

/// Timeout for ordinary requests, and the slack added to blocking ones.
const TIMEOUT_SECS: u64 = 5;

/// A client connection to the daemon.
pub struct DaemonClient {
    conn: Mutex<Connection>,
    request_timeout: Duration,
}

struct Connection {
    stream: UnixStream,
    /// Set after a failed read or write. The stream may hold part of a
    /// request or an unread reply, so it is never used again.
    broken: bool,
}

impl DaemonClient {
    /// Connect to the daemon at the given socket path.
    pub fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path).map_err(|e| {
            Error::Store(format!(
                "failed to connect to daemon at {}: {}",
                socket_path.display(),
                e
            ))
        })?;
        stream.set_write_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))?;
        Ok(DaemonClient {
            conn: Mutex::new(Connection {
                stream,
                broken: false,
            }),
            request_timeout: Duration::from_secs(TIMEOUT_SECS),
        })
    }

    /// Overrides how long an ordinary request waits for its reply, which
    /// is also the slack added to bounded blocking commands.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Send a request and receive its response. Requests on one client are
    /// serialized. Any I/O failure leaves the client unusable.
    fn request(&self, request: &DaemonRequest, read_timeout: Option<Duration>) -> Result<DaemonResponse> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if conn.broken {
            return Err(Error::Store(
                "connection to daemon is broken by an earlier failure".to_string(),
            ));
        }
        let result = exchange(&mut conn.stream, request, read_timeout);
        if result.is_err() {
            conn.broken = true;
        }
        Ok(result?)
    }

    fn control(&self, request: DaemonRequest) -> Result<DaemonResponse> {
        match self.request(&request, Some(self.request_timeout))? {
            DaemonResponse::Error { code, message } => Err(code.into_error(message)),
            response => Ok(response),
        }
    }

    /// Execute one store command.
    fn store_op(&self, op: StoreOp) -> Result<Reply> {
        let read_timeout = match op.blocking_timeout() {
            None => Some(self.request_timeout),
            Some(timeout) if timeout.is_forever() => None,
            Some(timeout) => {
                Some(Duration::from_secs(timeout.secs()).saturating_add(self.request_timeout))
            }
        };
        match self.request(&DaemonRequest::Store(op), read_timeout)? {
            DaemonResponse::Reply(reply) => Ok(reply),
            DaemonResponse::Error { code, message } => Err(code.into_error(message)),
            other => Err(unexpected(&other)),
        }
    }

    pub fn ping(&self) -> Result<()> {
        match self.control(DaemonRequest::Ping)? {
            DaemonResponse::Pong => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Version handshake. Returns the daemon's version.
    pub fn hello(&self) -> Result<String> {
        let request = DaemonRequest::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.control(request)? {
            DaemonResponse::Hello { version } => Ok(version),
            other => Err(unexpected(&other)),
        }
    }

    pub fn status(&self) -> Result<DaemonStatus> {
        match self.control(DaemonRequest::Status)? {
            DaemonResponse::Status(status) => Ok(status),
            other => Err(unexpected(&other)),
        }
    }

    /// Asks the daemon to stop. Blocked pops on other connections fail with
    /// [`Error::Closed`].
    pub fn shutdown(&self) -> Result<()> {
        match self.control(DaemonRequest::Shutdown)? {
            DaemonResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

fn exchange(
    stream: &mut UnixStream,
    request: &DaemonRequest,
    read_timeout: Option<Duration>,
) -> std::io::Result<DaemonResponse> {
    stream.set_read_timeout(read_timeout)?;
    framing::write_message(stream, request)?;
    framing::read_message(stream)
}

fn unexpected(response: &DaemonResponse) -> Error {
    Error::Store(format!("unexpected response: {:?}", response))
}

fn mismatch(expected: &str, reply: &Reply) -> Error {
    Error::Store(format!(
        "unexpected reply: expected {}, got {}",
        expected,
        reply.name()
    ))
}

fn done(reply: Reply) -> Result<()> {
    match reply {
        Reply::Done => Ok(()),
        other => Err(mismatch("done", &other)),
    }
}

fn boolean(reply: Reply) -> Result<bool> {
    match reply {
        Reply::Bool { value } => Ok(value),
        other => Err(mismatch("bool", &other)),
    }
}

fn count(reply: Reply) -> Result<usize> {
    match reply {
        Reply::Count { count } => Ok(count as usize),
        other => Err(mismatch("count", &other)),
    }
}

fn value(reply: Reply) -> Result<Option<Vec<u8>>> {
    match reply {
        Reply::Value { value } => Ok(value.map(Bytes::into_vec)),
        other => Err(mismatch("value", &other)),
    }
}

fn values(reply: Reply) -> Result<Vec<Vec<u8>>> {
    match reply {
        Reply::Values { values } => Ok(values_from_wire(values)),
        other => Err(mismatch("values", &other)),
    }
}

fn wire(token: &Token) -> Bytes {
    Bytes::from(token)
}

fn wire_all(values: &[Vec<u8>]) -> Vec<Bytes> {
    values.iter().map(|v| Bytes::from(v.as_slice())).collect()
}

impl RemoteStore for DaemonClient {
    fn type_of(&self, token: &Token) -> Result<Option<Kind>> {
        match self.store_op(StoreOp::TypeOf {
            token: wire(token),
        })? {
            Reply::Kind { kind } => Ok(kind),
            other => Err(mismatch("kind", &other)),
        }
    }

    fn delete(&self, token: &Token) -> Result<bool> {
        boolean(self.store_op(StoreOp::Delete {
            token: wire(token),
        })?)
    }

    fn range(&self, token: &Token, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        values(self.store_op(StoreOp::Range {
            token: wire(token),
            start,
            stop,
        })?)
    }

    fn trim(&self, token: &Token, start: i64, stop: i64) -> Result<()> {
        done(self.store_op(StoreOp::Trim {
            token: wire(token),
            start,
            stop,
        })?)
    }

    fn push(&self, token: &Token, end: End, values: Vec<Vec<u8>>) -> Result<usize> {
        count(self.store_op(StoreOp::Push {
            token: wire(token),
            end,
            values: values_to_wire(values),
        })?)
    }

    fn pop(&self, token: &Token, end: End) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::Pop {
            token: wire(token),
            end,
        })?)
    }

    fn blocking_pop(
        &self,
        tokens: &[Token],
        end: End,
        timeout: Timeout,
    ) -> Result<Option<(Token, Vec<u8>)>> {
        match self.store_op(StoreOp::BlockingPop {
            tokens: tokens_to_wire(tokens),
            end,
            timeout,
        })? {
            Reply::Delivered { delivered } => Ok(delivered
                .map(|(channel, value)| (channel.into_token(), value.into_vec()))),
            other => Err(mismatch("delivered", &other)),
        }
    }

    fn pop_push(&self, source: &Token, dest: &Token, end: End) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::PopPush {
            source: wire(source),
            dest: wire(dest),
            end,
        })?)
    }

    fn blocking_pop_push(
        &self,
        source: &Token,
        dest: &Token,
        end: End,
        timeout: Timeout,
    ) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::BlockingPopPush {
            source: wire(source),
            dest: wire(dest),
            end,
            timeout,
        })?)
    }

    fn len(&self, token: &Token) -> Result<usize> {
        count(self.store_op(StoreOp::Len {
            token: wire(token),
        })?)
    }

    fn index(&self, token: &Token, index: i64) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::Index {
            token: wire(token),
            index,
        })?)
    }

    fn set_at(&self, token: &Token, index: i64, value: Vec<u8>) -> Result<()> {
        done(self.store_op(StoreOp::SetAt {
            token: wire(token),
            index,
            value: Bytes(value),
        })?)
    }

    fn position(&self, token: &Token, value: &[u8]) -> Result<Option<usize>> {
        match self.store_op(StoreOp::Position {
            token: wire(token),
            value: Bytes::from(value),
        })? {
            Reply::Position { position } => Ok(position.map(|p| p as usize)),
            other => Err(mismatch("position", &other)),
        }
    }

    fn remove_equal(&self, token: &Token, value: &[u8]) -> Result<usize> {
        count(self.store_op(StoreOp::RemoveEqual {
            token: wire(token),
            value: Bytes::from(value),
        })?)
    }

    fn hash_get(&self, token: &Token, field: &[u8]) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::HashGet {
            token: wire(token),
            field: Bytes::from(field),
        })?)
    }

    fn hash_set(&self, token: &Token, field: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        boolean(self.store_op(StoreOp::HashSet {
            token: wire(token),
            field: Bytes(field),
            value: Bytes(value),
        })?)
    }

    fn hash_delete(&self, token: &Token, fields: &[Vec<u8>]) -> Result<usize> {
        count(self.store_op(StoreOp::HashDelete {
            token: wire(token),
            fields: wire_all(fields),
        })?)
    }

    fn hash_exists(&self, token: &Token, field: &[u8]) -> Result<bool> {
        boolean(self.store_op(StoreOp::HashExists {
            token: wire(token),
            field: Bytes::from(field),
        })?)
    }

    fn hash_len(&self, token: &Token) -> Result<usize> {
        count(self.store_op(StoreOp::HashLen {
            token: wire(token),
        })?)
    }

    fn hash_keys(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        values(self.store_op(StoreOp::HashKeys {
            token: wire(token),
        })?)
    }

    fn hash_values(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        values(self.store_op(StoreOp::HashValues {
            token: wire(token),
        })?)
    }

    fn hash_entries(&self, token: &Token) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        match self.store_op(StoreOp::HashEntries {
            token: wire(token),
        })? {
            Reply::Entries { entries } => Ok(entries
                .into_iter()
                .map(|(field, value)| (field.into_vec(), value.into_vec()))
                .collect()),
            other => Err(mismatch("entries", &other)),
        }
    }

    fn set_add(&self, token: &Token, members: Vec<Vec<u8>>) -> Result<usize> {
        count(self.store_op(StoreOp::SetAdd {
            token: wire(token),
            members: values_to_wire(members),
        })?)
    }

    fn set_remove(&self, token: &Token, members: &[Vec<u8>]) -> Result<usize> {
        count(self.store_op(StoreOp::SetRemove {
            token: wire(token),
            members: wire_all(members),
        })?)
    }

    fn set_contains(&self, token: &Token, member: &[u8]) -> Result<bool> {
        boolean(self.store_op(StoreOp::SetContains {
            token: wire(token),
            member: Bytes::from(member),
        })?)
    }

    fn set_len(&self, token: &Token) -> Result<usize> {
        count(self.store_op(StoreOp::SetLen {
            token: wire(token),
        })?)
    }

    fn set_members(&self, token: &Token) -> Result<Vec<Vec<u8>>> {
        values(self.store_op(StoreOp::SetMembers {
            token: wire(token),
        })?)
    }

    fn set_pop(&self, token: &Token) -> Result<Option<Vec<u8>>> {
        value(self.store_op(StoreOp::SetPop {
            token: wire(token),
        })?)
    }

    fn set_combine(&self, op: SetOp, tokens: &[Token]) -> Result<Vec<Vec<u8>>> {
        values(self.store_op(StoreOp::SetCombine {
            set_op: op,
            tokens: tokens_to_wire(tokens),
        })?)
    }

    fn set_combine_store(&self, op: SetOp, dest: &Token, tokens: &[Token]) -> Result<usize> {
        count(self.store_op(StoreOp::SetCombineStore {
            set_op: op,
            dest: wire(dest),
            tokens: tokens_to_wire(tokens),
        })?)
    }

    fn counter_add(&self, token: &Token, values: Vec<Vec<u8>>) -> Result<bool> {
        boolean(self.store_op(StoreOp::CounterAdd {
            token: wire(token),
            values: values_to_wire(values),
        })?)
    }

    fn counter_count(&self, tokens: &[Token]) -> Result<u64> {
        match self.store_op(StoreOp::CounterCount {
            tokens: tokens_to_wire(tokens),
        })? {
            Reply::Count { count } => Ok(count),
            other => Err(mismatch("count", &other)),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
