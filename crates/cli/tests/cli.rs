// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests: the `remcol` binary and `DaemonClient` against a
//! daemon served from a thread of the test process.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use predicates::prelude::*;
use remcol::{Codec, DaemonClient, List, Outcome, PopOptions, Queue, RemoteStore, Slice};
use remcol_core::{Error as StoreError, Timeout, Token};
use remcold::Server;
use tempfile::TempDir;

struct Daemon {
    _dir: TempDir,
    socket: PathBuf,
    thread: Option<JoinHandle<()>>,
}

impl Daemon {
    fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("daemon.sock");
        let server = Server::bind(&socket).unwrap();
        let thread = thread::spawn(move || server.run());
        Self {
            _dir: dir,
            socket,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Arc<DaemonClient> {
        Arc::new(DaemonClient::connect(&self.socket).unwrap())
    }

    fn remcol(&self) -> Command {
        let mut cmd = Command::cargo_bin("remcol").unwrap();
        cmd.arg("--socket")
            .arg(&self.socket)
            .env("REMCOL_CONFIG", self.socket.with_file_name("remcol.toml"))
            .env_remove("REMCOL_SOCKET");
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Ok(client) = DaemonClient::connect(&self.socket) {
            let _ = client.shutdown();
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn list(client: &Arc<DaemonClient>, token: &str) -> List<String, DaemonClient> {
    List::open(Arc::clone(client), Some(Token::from(token)), Codec::default()).unwrap()
}

fn letters() -> Vec<String> {
    ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// CLI

#[test]
fn push_range_and_pop_through_the_binary() {
    let daemon = Daemon::start();
    daemon
        .remcol()
        .args(["push", "jobs", "1", "\"two\""])
        .assert()
        .success()
        .stdout("2\n");
    daemon
        .remcol()
        .args(["range", "jobs"])
        .assert()
        .success()
        .stdout("1\n\"two\"\n");
    daemon
        .remcol()
        .args(["pop", "jobs"])
        .assert()
        .success()
        .stdout("1\n");
    daemon
        .remcol()
        .args(["len", "jobs"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn positional_edits_through_the_binary() {
    let daemon = Daemon::start();
    daemon
        .remcol()
        .args(["push", "l", "0", "1", "2", "3", "4", "5"])
        .assert()
        .success();
    daemon.remcol().args(["delete", "l", "1::2"]).assert().success();
    daemon.remcol().args(["insert", "l", "1", "9"]).assert().success();
    daemon
        .remcol()
        .args(["range", "l"])
        .assert()
        .success()
        .stdout("0\n9\n2\n4\n");
}

#[test]
fn errors_exit_with_status_one() {
    let daemon = Daemon::start();
    daemon
        .remcol()
        .args(["get", "missing", "0"])
        .assert()
        .success()
        .stdout("");
    daemon.remcol().args(["push", "l", "1"]).assert().success();
    daemon
        .remcol()
        .args(["set", "l", "5", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: index out of range"));
    daemon
        .remcol()
        .args(["push", "l", "bare words"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn daemon_ping_and_status() {
    let daemon = Daemon::start();
    daemon
        .remcol()
        .args(["daemon", "ping"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pong (remcold v"));
    daemon.remcol().args(["push", "k", "1"]).assert().success();
    daemon
        .remcol()
        .args(["daemon", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keys: 1"));
}

#[test]
fn missing_daemon_is_reported() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("absent.sock");
    Command::cargo_bin("remcol")
        .unwrap()
        .args(["len", "l", "--socket"])
        .arg(&socket)
        .env("REMCOL_CONFIG", dir.path().join("remcol.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("remcol daemon start"));
    Command::cargo_bin("remcol")
        .unwrap()
        .args(["daemon", "stop", "--socket"])
        .arg(&socket)
        .env("REMCOL_CONFIG", dir.path().join("remcol.toml"))
        .assert()
        .success()
        .stdout("daemon not running\n");
}

// Library over the socket

#[test]
fn splice_deletes_over_the_socket() {
    let daemon = Daemon::start();
    let client = daemon.client();
    let l = list(&client, "letters");
    l.extend(&letters()).unwrap();

    l.delete(1).unwrap();
    l.delete(-2).unwrap();
    assert_eq!(l.to_vec().unwrap(), ["a", "c", "d", "f"]);
    l.delete_range(&Slice::from(1..3)).unwrap();
    assert_eq!(l.to_vec().unwrap(), ["a", "f"]);
}

#[test]
fn errors_cross_the_socket_intact() {
    let daemon = Daemon::start();
    let client = daemon.client();
    let l = list(&client, "short");
    l.push(&"x".to_string()).unwrap();

    let err = l.set(5, &"y".to_string()).unwrap_err();
    assert!(matches!(err, StoreError::IndexOutOfRange { index: 5, len: 1 }));

    client
        .set_add(&Token::from("members"), vec![b"m".to_vec()])
        .unwrap();
    let err = client.len(&Token::from("members")).unwrap_err();
    assert!(matches!(err, StoreError::WrongType { .. }));
}

#[test]
fn priority_queue_over_the_socket() {
    let daemon = Daemon::start();
    let client = daemon.client();
    let orders: Queue<String, DaemonClient> =
        Queue::open(Arc::clone(&client), Some(Token::from("orders")), Codec::default()).unwrap();
    let fallback: Queue<String, DaemonClient> =
        Queue::open(Arc::clone(&client), Some(Token::from("fallback")), Codec::default())
            .unwrap();
    fallback.put(&"spare".to_string()).unwrap();
    orders.put(&"order".to_string()).unwrap();

    let aux = [fallback.token().clone()];
    let first = orders.pop(&aux, PopOptions::blocking(Timeout(1))).unwrap();
    assert!(matches!(first, Outcome::Delivered { ref channel, .. } if *channel == Token::from("orders")));
    let second = orders.pop(&aux, PopOptions::blocking(Timeout(1))).unwrap();
    assert_eq!(second.into_value(), Some("spare".to_string()));

    let started = Instant::now();
    let empty = orders.pop(&aux, PopOptions::non_blocking()).unwrap();
    assert_eq!(empty, Outcome::Empty);
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn blocking_pop_wakes_on_push_from_other_connection() {
    let daemon = Daemon::start();
    let consumer = daemon.client();
    let producer = daemon.client();
    let worker = thread::spawn(move || {
        let queue: Queue<i32, DaemonClient> =
            Queue::open(consumer, Some(Token::from("wake")), Codec::default()).unwrap();
        queue.get(true, Timeout(5)).unwrap()
    });

    thread::sleep(Duration::from_millis(100));
    let queue: Queue<i32, DaemonClient> =
        Queue::open(producer, Some(Token::from("wake")), Codec::default()).unwrap();
    queue.put(&42).unwrap();

    assert_eq!(worker.join().unwrap().into_value(), Some(42));
}

#[test]
fn shutdown_fails_pending_blocking_pop() {
    let daemon = Daemon::start();
    let consumer = daemon.client();
    let worker = thread::spawn(move || {
        consumer.blocking_pop(&[Token::from("never")], remcol::End::Tail, Timeout::FOREVER)
    });

    thread::sleep(Duration::from_millis(100));
    daemon.client().shutdown().unwrap();
    let result = worker.join().unwrap();
    assert!(matches!(result, Err(StoreError::Closed)));
}

#[test]
fn circulate_restores_order_over_the_socket() {
    let daemon = Daemon::start();
    let client = daemon.client();
    let l = list(&client, "ring");
    l.extend(&letters()).unwrap();
    for _ in 0..letters().len() {
        l.circulate(None).unwrap();
    }
    assert_eq!(l.to_vec().unwrap(), letters());
}
