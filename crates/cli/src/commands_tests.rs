// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use clap::Parser;
use remcol_core::{Codec, Error as StoreError, MemoryStore};
use yare::parameterized;

use super::*;

fn settings() -> Settings {
    Settings {
        socket: PathBuf::from("/nonexistent/daemon.sock"),
        state_dir: PathBuf::from("/nonexistent"),
        codec: Codec::default(),
        timeout: Timeout(1),
    }
}

struct Harness {
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    fn try_run(&self, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("remcol").chain(args.iter().copied()))
            .map_err(|e| Error::Config(e.to_string()))?;
        let mut out = Vec::new();
        collection(cli.command, self.store.clone(), &settings(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn run(&self, args: &[&str]) -> String {
        self.try_run(args).unwrap()
    }
}

#[test]
fn test_push_and_range() {
    let h = Harness::new();
    assert_eq!(h.run(&["push", "l", "1", "\"two\"", "{\"n\":3}"]), "3\n");
    assert_eq!(h.run(&["range", "l"]), "1\n\"two\"\n{\"n\":3}\n");
    assert_eq!(h.run(&["push", "--front", "l", "0", "-1"]), "5\n");
    assert_eq!(h.run(&["range", "l", ":2"]), "-1\n0\n");
}

#[test]
fn test_push_rejects_invalid_json() {
    let h = Harness::new();
    let err = h.try_run(&["push", "l", "not json"]).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert_eq!(h.run(&["len", "l"]), "0\n");
}

#[test]
fn test_pop_is_first_in_first_out() {
    let h = Harness::new();
    h.run(&["push", "q", "1", "2"]);
    assert_eq!(h.run(&["pop", "q"]), "1\n");
    assert_eq!(h.run(&["pop", "q", "--tail"]), "2\n");
    assert_eq!(h.run(&["pop", "q"]), "");
}

#[test]
fn test_pop_reports_channel() {
    let h = Harness::new();
    h.run(&["push", "fallback", "\"spare\""]);
    assert_eq!(
        h.run(&["pop", "orders", "--aux", "fallback", "--block", "--channel"]),
        "fallback\t\"spare\"\n"
    );
}

#[test]
fn test_blocking_pop_times_out_silently() {
    let h = Harness::new();
    assert_eq!(h.run(&["pop", "idle", "--block", "--timeout", "1"]), "");
}

#[test]
fn test_get_and_set() {
    let h = Harness::new();
    h.run(&["push", "l", "1", "2", "3"]);
    h.run(&["set", "l", "-1", "30"]);
    assert_eq!(h.run(&["get", "l", "-1"]), "30\n");

    assert_eq!(h.run(&["get", "l", "7"]), "");
    assert_eq!(h.run(&["get", "missing", "0"]), "");

    let err = h.try_run(&["set", "l", "7", "1"]).unwrap_err();
    assert_eq!(err.to_string(), "index out of range: 7 (length 3)");
}

#[test]
fn test_insert_shifts_right() {
    let h = Harness::new();
    h.run(&["push", "l", "1", "2", "3", "4"]);
    h.run(&["insert", "l", "1", "9"]);
    assert_eq!(h.run(&["range", "l"]), "1\n9\n2\n3\n4\n");
}

#[parameterized(
    index = { "2", "0\n1\n3\n4\n5\n" },
    negative_index = { "-1", "0\n1\n2\n3\n4\n" },
    run = { "1:3", "0\n3\n4\n5\n" },
    stepped = { "1::2", "0\n2\n4\n" },
)]
fn test_delete_targets(target: &str, remaining: &str) {
    let h = Harness::new();
    h.run(&["push", "l", "0", "1", "2", "3", "4", "5"]);
    h.run(&["delete", "l", target]);
    assert_eq!(h.run(&["range", "l"]), remaining);
}

#[test]
fn test_delete_rejects_bad_target() {
    let h = Harness::new();
    h.run(&["push", "l", "0"]);
    assert!(matches!(
        h.try_run(&["delete", "l", "first"]).unwrap_err(),
        Error::InvalidIndex(_)
    ));
    assert!(matches!(
        h.try_run(&["delete", "l", "::0"]).unwrap_err(),
        Error::Store(StoreError::InvalidStep)
    ));
}

#[test]
fn test_rotate_and_drop() {
    let h = Harness::new();
    h.run(&["push", "l", "1", "2", "3"]);
    assert_eq!(h.run(&["rotate", "l"]), "3\n");
    assert_eq!(h.run(&["range", "l"]), "3\n1\n2\n");
    assert_eq!(h.run(&["rotate", "l", "--to", "other"]), "2\n");
    assert_eq!(h.run(&["range", "other"]), "2\n");

    assert_eq!(h.run(&["drop", "l"]), "1\n");
    assert_eq!(h.run(&["drop", "l"]), "0\n");
    assert_eq!(h.store.key_count().unwrap(), 1);
}

#[test]
fn test_parse_value_accepts_any_json() {
    assert_eq!(parse_value("[1, 2]").unwrap(), serde_json::json!([1, 2]));
    assert_eq!(parse_value("null").unwrap(), Value::Null);
    assert!(parse_value("'single'").is_err());
}
