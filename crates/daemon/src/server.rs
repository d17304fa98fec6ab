// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket server: one thread per connection, requests served in order
//! until the client hangs up.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Cursor, ErrorKind, Read};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use remcol_core::MemoryStore;
use remcol_ipc::{framing, DaemonRequest, DaemonResponse};

use crate::handler::{serve_request, Context, PopOrigin};

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Server {
    listener: UnixListener,
    socket_path: PathBuf,
    ctx: Arc<Context>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Binds `socket_path`, replacing a stale socket file left behind by a
    /// previous instance.
    pub fn bind(socket_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let socket_path = socket_path.into();
        let _ = fs::remove_file(&socket_path);
        let listener = UnixListener::bind(&socket_path)?;
        Ok(Self {
            listener,
            socket_path,
            ctx: Arc::new(Context::new(MemoryStore::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Shared handler state, including the backing store.
    pub fn context(&self) -> Arc<Context> {
        Arc::clone(&self.ctx)
    }

    /// Accepts connections until a client requests shutdown, then removes
    /// the socket file.
    pub fn run(self) {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let ctx = Arc::clone(&self.ctx);
                    let shutdown = Arc::clone(&self.shutdown);
                    let socket_path = self.socket_path.clone();
                    let spawned = thread::Builder::new()
                        .name("remcold-conn".to_string())
                        .spawn(move || serve_connection(stream, &ctx, &shutdown, &socket_path));
                    if let Err(e) = spawned {
                        tracing::warn!("failed to spawn connection thread: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to accept connection: {}", e);
                }
            }
        }
        let _ = fs::remove_file(&self.socket_path);
        tracing::info!("server stopped");
    }
}

/// One client connection.
///
/// While a blocking command waits, end-of-file on the socket means the
/// client hung up. Anything it sent in the meantime is kept for the next
/// request.
struct Peer {
    stream: UnixStream,
    pending: RefCell<Vec<u8>>,
}

impl Peer {
    fn new(stream: UnixStream) -> Self {
        Self {
            stream,
            pending: RefCell::new(Vec::new()),
        }
    }

    fn read_request(&mut self) -> io::Result<DaemonRequest> {
        let pending = std::mem::take(self.pending.get_mut());
        let mut reader = Cursor::new(pending).chain(&self.stream);
        let request = framing::read_message(&mut reader);
        let (rest, _) = reader.into_inner();
        let consumed = (rest.position() as usize).min(rest.get_ref().len());
        let mut rest = rest.into_inner();
        rest.drain(..consumed);
        *self.pending.get_mut() = rest;
        request
    }

    fn write_response(&mut self, response: &DaemonResponse) -> io::Result<()> {
        framing::write_message(&mut self.stream, response)
    }

    /// Checks without blocking whether the client is still there.
    fn connected(&self) -> bool {
        if self.stream.set_nonblocking(true).is_err() {
            return false;
        }
        let mut buf = [0u8; 4096];
        let connected = match (&self.stream).read(&mut buf) {
            Ok(0) => false,
            Ok(n) => {
                self.pending.borrow_mut().extend_from_slice(&buf[..n]);
                true
            }
            Err(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted),
        };
        connected && self.stream.set_nonblocking(false).is_ok()
    }
}

fn serve_connection(stream: UnixStream, ctx: &Context, shutdown: &AtomicBool, socket_path: &Path) {
    let _ = stream.set_write_timeout(Some(WRITE_TIMEOUT));
    let mut peer = Peer::new(stream);
    tracing::debug!("connection opened");
    loop {
        let request = match peer.read_request() {
            Ok(request) => request,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                tracing::warn!("failed to read request: {}", e);
                break;
            }
        };

        let origin = PopOrigin::of(&request);
        let response = serve_request(request, ctx, &|| peer.connected());
        let should_shutdown = matches!(response, DaemonResponse::ShuttingDown);
        if should_shutdown {
            tracing::info!("shutting down");
            shutdown.store(true, Ordering::SeqCst);
            ctx.store.close();
        }

        if let Err(e) = peer.write_response(&response) {
            tracing::warn!("failed to write response: {}", e);
            if let Some(origin) = origin {
                match origin.restore(&ctx.store, &response) {
                    Ok(true) => tracing::debug!("requeued undelivered element"),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("failed to requeue undelivered element: {}", e),
                }
            }
            break;
        }

        if should_shutdown {
            // Wake the accept loop so it observes the flag.
            let _ = UnixStream::connect(socket_path);
            break;
        }
    }
    tracing::debug!("connection closed");
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
