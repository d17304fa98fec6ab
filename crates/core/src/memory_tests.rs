// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use yare::parameterized;

fn b(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

fn strings(values: Vec<Vec<u8>>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| String::from_utf8(v).unwrap())
        .collect()
}

fn store_with(token: &str, items: &[&str]) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .push(&Token::from(token), End::Tail, items.iter().map(|s| b(s)).collect())
        .unwrap();
    store
}

fn contents(store: &MemoryStore, token: &str) -> Vec<String> {
    strings(store.range(&Token::from(token), 0, -1).unwrap())
}

#[parameterized(
    all = { 0, -1, &["a", "b", "c", "d", "e"] },
    middle = { 1, 3, &["b", "c", "d"] },
    negative = { -2, -1, &["d", "e"] },
    clamped_stop = { 3, 100, &["d", "e"] },
    clamped_start = { -100, 0, &["a"] },
    reversed = { 3, 1, &[] },
    past_end = { 5, 9, &[] },
)]
fn range_follows_inclusive_store_semantics(start: i64, stop: i64, expected: &[&str]) {
    let store = store_with("l", &["a", "b", "c", "d", "e"]);
    let got = strings(store.range(&Token::from("l"), start, stop).unwrap());
    assert_eq!(got, expected);
}

#[parameterized(
    drop_first = { 1, -1, &["b", "c", "d", "e"] },
    drop_last = { 0, -2, &["a", "b", "c", "d"] },
    keep_middle = { 1, 2, &["b", "c"] },
    keep_nothing = { 1, 0, &[] },
)]
fn trim_keeps_inclusive_range(start: i64, stop: i64, expected: &[&str]) {
    let store = store_with("l", &["a", "b", "c", "d", "e"]);
    store.trim(&Token::from("l"), start, stop).unwrap();
    assert_eq!(contents(&store, "l"), expected);
}

#[test]
fn trimming_everything_removes_the_key() {
    let store = store_with("l", &["a"]);
    let token = Token::from("l");
    store.trim(&token, 1, -1).unwrap();
    assert_eq!(store.type_of(&token).unwrap(), None);
}

#[test]
fn head_push_is_stack_ordered() {
    let store = store_with("l", &["x"]);
    store
        .push(&Token::from("l"), End::Head, vec![b("a"), b("b")])
        .unwrap();
    assert_eq!(contents(&store, "l"), vec!["b", "a", "x"]);
}

#[test]
fn pop_from_both_ends_and_missing_key() {
    let store = store_with("l", &["a", "b", "c"]);
    let token = Token::from("l");
    assert_eq!(store.pop(&token, End::Head).unwrap(), Some(b("a")));
    assert_eq!(store.pop(&token, End::Tail).unwrap(), Some(b("c")));
    assert_eq!(store.pop(&Token::from("missing"), End::Tail).unwrap(), None);
}

#[test]
fn index_and_set_at_bounds() {
    let store = store_with("l", &["a", "b", "c"]);
    let token = Token::from("l");
    assert_eq!(store.index(&token, -1).unwrap(), Some(b("c")));
    assert_eq!(store.index(&token, 3).unwrap(), None);

    store.set_at(&token, -3, b("z")).unwrap();
    assert_eq!(contents(&store, "l"), vec!["z", "b", "c"]);

    let err = store.set_at(&token, 3, b("q")).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 3, len: 3 }));

    let err = store.set_at(&Token::from("missing"), 0, b("q")).unwrap_err();
    assert!(matches!(err, Error::NoSuchKey(_)));
}

#[test]
fn position_and_remove_equal() {
    let store = store_with("l", &["a", "b", "a", "c"]);
    let token = Token::from("l");
    assert_eq!(store.position(&token, b"a").unwrap(), Some(0));
    assert_eq!(store.position(&token, b"c").unwrap(), Some(3));
    assert_eq!(store.position(&token, b"q").unwrap(), None);
    assert_eq!(store.remove_equal(&token, b"a").unwrap(), 2);
    assert_eq!(contents(&store, "l"), vec!["b", "c"]);
}

#[test]
fn list_commands_reject_other_kinds() {
    let store = MemoryStore::new();
    let token = Token::from("h");
    store.hash_set(&token, b("f"), b("v")).unwrap();
    let err = store.push(&token, End::Tail, vec![b("x")]).unwrap_err();
    assert!(matches!(err, Error::WrongType { .. }));
    assert_eq!(store.type_of(&token).unwrap(), Some(Kind::Hash));
}

#[test]
fn pop_push_rotates_same_token() {
    let store = store_with("l", &["a", "b", "c"]);
    let token = Token::from("l");
    assert_eq!(store.pop_push(&token, &token, End::Tail).unwrap(), Some(b("c")));
    assert_eq!(contents(&store, "l"), vec!["c", "a", "b"]);
    assert_eq!(store.pop_push(&token, &token, End::Head).unwrap(), Some(b("c")));
    assert_eq!(contents(&store, "l"), vec!["a", "b", "c"]);
}

#[test]
fn pop_push_moves_between_tokens() {
    let store = store_with("src", &["a", "b"]);
    store.push(&Token::from("dst"), End::Tail, vec![b("x")]).unwrap();
    let moved = store
        .pop_push(&Token::from("src"), &Token::from("dst"), End::Tail)
        .unwrap();
    assert_eq!(moved, Some(b("b")));
    assert_eq!(contents(&store, "src"), vec!["a"]);
    assert_eq!(contents(&store, "dst"), vec!["b", "x"]);
}

#[test]
fn pop_push_to_mistyped_destination_keeps_source() {
    let store = store_with("src", &["a"]);
    store.set_add(&Token::from("dst"), vec![b("m")]).unwrap();
    let err = store
        .pop_push(&Token::from("src"), &Token::from("dst"), End::Tail)
        .unwrap_err();
    assert!(matches!(err, Error::WrongType { .. }));
    assert_eq!(contents(&store, "src"), vec!["a"]);
}

#[test]
fn blocking_pop_prefers_earlier_channel() {
    let store = store_with("orders", &["x"]);
    store
        .push(&Token::from("fallback"), End::Tail, vec![b("y")])
        .unwrap();
    let tokens = [Token::from("orders"), Token::from("fallback")];
    let popped = store.blocking_pop(&tokens, End::Tail, Timeout(1)).unwrap();
    assert_eq!(popped, Some((Token::from("orders"), b("x"))));
    let popped = store.blocking_pop(&tokens, End::Tail, Timeout(1)).unwrap();
    assert_eq!(popped, Some((Token::from("fallback"), b("y"))));
}

#[test]
fn blocking_pop_times_out() {
    let store = MemoryStore::new();
    let start = Instant::now();
    let popped = store
        .blocking_pop(&[Token::from("empty")], End::Tail, Timeout(1))
        .unwrap();
    assert_eq!(popped, None);
    assert!(start.elapsed() >= Duration::from_millis(900));
}

#[test]
fn blocking_pop_wakes_on_push() {
    let store = Arc::new(MemoryStore::new());
    let producer = Arc::clone(&store);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        producer
            .push(&Token::from("late"), End::Head, vec![b("item")])
            .unwrap();
    });
    let popped = store
        .blocking_pop(&[Token::from("late")], End::Tail, Timeout::FOREVER)
        .unwrap();
    handle.join().unwrap();
    assert_eq!(popped, Some((Token::from("late"), b("item"))));
}

#[test]
fn unrepresentable_deadline_waits_until_push() {
    let store = Arc::new(MemoryStore::new());
    let producer = Arc::clone(&store);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        producer
            .push(&Token::from("far"), End::Head, vec![b("item")])
            .unwrap();
    });
    let timeout = Timeout::from_secs_f64(1e30);
    assert_eq!(timeout, Timeout(u64::MAX));
    let popped = store
        .blocking_pop(&[Token::from("far")], End::Tail, timeout)
        .unwrap();
    handle.join().unwrap();
    assert_eq!(popped, Some((Token::from("far"), b("item"))));

    store
        .push(&Token::from("src"), End::Tail, vec![b("moved")])
        .unwrap();
    let moved = store
        .blocking_pop_push(&Token::from("src"), &Token::from("dst"), End::Tail, Timeout(u64::MAX))
        .unwrap();
    assert_eq!(moved, Some(b("moved")));
}

#[test]
fn watched_pop_gives_up_without_taking() {
    let store = Arc::new(MemoryStore::new());
    let gone = Arc::new(AtomicBool::new(false));
    let waiter = Arc::clone(&store);
    let flag = Arc::clone(&gone);
    let handle = thread::spawn(move || {
        waiter.blocking_pop_while(&[Token::from("jobs")], End::Tail, Timeout::FOREVER, &|| {
            !flag.load(Ordering::SeqCst)
        })
    });
    thread::sleep(Duration::from_millis(50));
    gone.store(true, Ordering::SeqCst);
    let started = Instant::now();
    assert_eq!(handle.join().unwrap().unwrap(), None);
    assert!(started.elapsed() < Duration::from_secs(1));

    store
        .push(&Token::from("jobs"), End::Head, vec![b("job")])
        .unwrap();
    assert_eq!(contents(&store, "jobs"), ["job"]);
}

#[test]
fn watched_pop_delivers_while_caller_waits() {
    let store = store_with("jobs", &["job"]);
    let popped = store
        .blocking_pop_while(&[Token::from("jobs")], End::Tail, Timeout(1), &|| true)
        .unwrap();
    assert_eq!(popped, Some((Token::from("jobs"), b("job"))));
    let moved = store
        .blocking_pop_push_while(&Token::from("a"), &Token::from("b"), End::Tail, Timeout(1), &|| true)
        .unwrap();
    assert_eq!(moved, None);
}

#[test]
fn close_wakes_blocked_waiters() {
    let store = Arc::new(MemoryStore::new());
    let waiter = Arc::clone(&store);
    let handle = thread::spawn(move || {
        waiter.blocking_pop(&[Token::from("never")], End::Tail, Timeout::FOREVER)
    });
    thread::sleep(Duration::from_millis(50));
    store.close();
    let result = handle.join().unwrap();
    assert!(matches!(result, Err(Error::Closed)));
    assert!(matches!(store.len(&Token::from("never")), Err(Error::Closed)));
}

#[test]
fn stats_count_commands_and_elements() {
    let store = MemoryStore::new();
    let token = Token::from("l");
    store
        .push(&token, End::Tail, vec![b("a"), b("b"), b("c")])
        .unwrap();
    store.range(&token, 0, 1).unwrap();
    store.trim(&token, 1, -1).unwrap();
    assert_eq!(
        store.stats(),
        StoreStats {
            commands: 3,
            elements_sent: 2,
            elements_received: 3,
        }
    );
}

#[test]
fn hash_commands() {
    let store = MemoryStore::new();
    let token = Token::from("h");
    assert!(store.hash_set(&token, b("a"), b("1")).unwrap());
    assert!(!store.hash_set(&token, b("a"), b("2")).unwrap());
    store.hash_set(&token, b("b"), b("3")).unwrap();

    assert_eq!(store.hash_get(&token, b"a").unwrap(), Some(b("2")));
    assert!(store.hash_exists(&token, b"b").unwrap());
    assert_eq!(store.hash_len(&token).unwrap(), 2);
    assert_eq!(strings(store.hash_keys(&token).unwrap()), vec!["a", "b"]);
    assert_eq!(strings(store.hash_values(&token).unwrap()), vec!["2", "3"]);
    assert_eq!(
        store.hash_entries(&token).unwrap(),
        vec![(b("a"), b("2")), (b("b"), b("3"))]
    );

    assert_eq!(store.hash_delete(&token, &[b("a"), b("b"), b("z")]).unwrap(), 2);
    assert_eq!(store.type_of(&token).unwrap(), None);
}

#[test]
fn set_commands() {
    let store = MemoryStore::new();
    let a = Token::from("a");
    let c = Token::from("c");
    assert_eq!(store.set_add(&a, vec![b("1"), b("2"), b("2")]).unwrap(), 2);
    store.set_add(&c, vec![b("2"), b("3")]).unwrap();

    assert!(store.set_contains(&a, b"1").unwrap());
    assert_eq!(store.set_len(&a).unwrap(), 2);
    let tokens = [a.clone(), c.clone()];
    assert_eq!(
        strings(store.set_combine(SetOp::Union, &tokens).unwrap()),
        vec!["1", "2", "3"]
    );
    assert_eq!(
        strings(store.set_combine(SetOp::Intersection, &tokens).unwrap()),
        vec!["2"]
    );
    assert_eq!(
        strings(store.set_combine(SetOp::Difference, &tokens).unwrap()),
        vec!["1"]
    );

    let dest = Token::from("d");
    assert_eq!(store.set_combine_store(SetOp::Union, &dest, &tokens).unwrap(), 3);
    assert_eq!(store.set_len(&dest).unwrap(), 3);

    assert_eq!(store.set_remove(&a, &[b("1")]).unwrap(), 1);
    assert_eq!(store.set_pop(&a).unwrap(), Some(b("2")));
    assert_eq!(store.type_of(&a).unwrap(), None);
}

#[test]
fn counter_commands() {
    let store = MemoryStore::new();
    let left = Token::from("visits:mon");
    let right = Token::from("visits:tue");
    assert!(store.counter_add(&left, vec![b("ann"), b("bob")]).unwrap());
    assert!(!store.counter_add(&left, vec![b("ann")]).unwrap());
    store.counter_add(&right, vec![b("bob"), b("cy")]).unwrap();

    assert_eq!(store.type_of(&left).unwrap(), Some(Kind::String));
    assert_eq!(store.counter_count(&[left.clone()]).unwrap(), 2);
    assert_eq!(store.counter_count(&[left, right]).unwrap(), 3);
}

#[test]
fn key_count_tracks_live_entries() {
    let store = store_with("l", &["a"]);
    store.set_add(&Token::from("s"), vec![b("m")]).unwrap();
    assert_eq!(store.key_count().unwrap(), 2);
    store.delete(&Token::from("l")).unwrap();
    assert_eq!(store.key_count().unwrap(), 1);
}
