// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use remcol_core::{End, MemoryStore, TOKEN_LENGTH};

use super::*;

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

#[test]
fn open_without_token_generates_random_one() {
    let store = store();
    let a = Handle::open(Arc::clone(&store), None, Kind::List, Codec::default()).unwrap();
    let b = Handle::open(store, None, Kind::List, Codec::default()).unwrap();
    assert_eq!(a.token().as_bytes().len(), TOKEN_LENGTH);
    assert_ne!(a.token(), b.token());
}

#[test]
fn open_keeps_entry_of_matching_kind() {
    let store = store();
    let token = Token::from("jobs");
    store.push(&token, End::Tail, vec![b"1".to_vec()]).unwrap();

    let handle = Handle::open(Arc::clone(&store), Some(token.clone()), Kind::List, Codec::default())
        .unwrap();
    assert_eq!(handle.kind(), Kind::List);
    assert_eq!(store.len(&token).unwrap(), 1);
}

#[test]
fn open_replaces_entry_of_other_kind() {
    let store = store();
    let token = Token::from("jobs");
    store.set_add(&token, vec![b"x".to_vec()]).unwrap();

    Handle::open(Arc::clone(&store), Some(token.clone()), Kind::List, Codec::default()).unwrap();
    assert_eq!(store.type_of(&token).unwrap(), None);
}

#[test]
fn alias_shares_remote_contents() {
    let store = store();
    let handle = Handle::open(store, Some(Token::from("shared")), Kind::List, Codec::default())
        .unwrap();
    let alias = handle.alias();
    alias
        .store()
        .push(alias.token(), End::Tail, vec![handle.encode(&7).unwrap()])
        .unwrap();

    let raw = handle.store().range(handle.token(), 0, -1).unwrap();
    assert_eq!(handle.decode_all::<i32>(&raw).unwrap(), vec![7]);
}

#[test]
fn destroy_reports_whether_entry_existed() {
    let store = store();
    let handle = Handle::open(store, Some(Token::from("gone")), Kind::List, Codec::default())
        .unwrap();
    assert!(!handle.destroy().unwrap());
    handle
        .store()
        .push(handle.token(), End::Tail, vec![b"1".to_vec()])
        .unwrap();
    assert!(handle.destroy().unwrap());
}

#[test]
fn set_codec_changes_payload_encoding() {
    let store = store();
    let mut handle = Handle::open(store, None, Kind::List, Codec::default()).unwrap();
    let json = handle.encode("value").unwrap();
    handle.set_codec("cbor+lz4".parse().unwrap());
    let packed = handle.encode("value").unwrap();

    assert_eq!(json, b"\"value\"");
    assert_ne!(json, packed);
    assert_eq!(handle.decode::<String>(&packed).unwrap(), "value");
}

#[test]
fn decode_opt_passes_none_through() {
    let handle = Handle::open(store(), None, Kind::List, Codec::default()).unwrap();
    assert_eq!(handle.decode_opt::<i32>(None).unwrap(), None);
    assert_eq!(
        handle.decode_opt::<i32>(Some(b"3".to_vec())).unwrap(),
        Some(3)
    );
}
