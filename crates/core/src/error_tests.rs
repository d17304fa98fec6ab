// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    unsupported_key = { Error::UnsupportedKey("null".into()), "null" },
    invalid_step = { Error::InvalidStep, "zero" },
    no_such_key = { Error::NoSuchKey("orders".into()), "orders" },
    closed = { Error::Closed, "closed" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_index_out_of_range_display() {
    let err = Error::IndexOutOfRange { index: -7, len: 3 };
    let msg = err.to_string();
    assert!(msg.contains("-7"));
    assert!(msg.contains("length 3"));
}

#[test]
fn error_wrong_type_display() {
    let err = Error::WrongType {
        token: "jobs".into(),
        expected: "list".into(),
        found: "hash".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("jobs"));
    assert!(msg.contains("expected list"));
    assert!(msg.contains("found hash"));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "socket closed");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
