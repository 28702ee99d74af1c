//! One-shot cell tests

use std::time::Duration;

use tokio::time::timeout;

use crate::{OneShot, OneShotError};

#[tokio::test]
async fn test_set_then_get() {
    let cell = OneShot::new();
    cell.set(42u32).unwrap();
    assert_eq!(*cell.get().await, 42);
    // Reading after completion returns immediately, any number of times
    assert_eq!(*cell.get().await, 42);
}

#[tokio::test]
async fn test_get_blocks_until_set() {
    let cell: OneShot<String> = OneShot::new();

    // Not set yet: get must suspend
    let pending = timeout(Duration::from_millis(20), cell.get()).await;
    assert!(pending.is_err());

    let producer = cell.clone();
    let waiter = tokio::spawn(async move { cell.get().await });

    producer.set("value".to_owned()).unwrap();
    assert_eq!(*waiter.await.unwrap(), "value");
}

#[tokio::test]
async fn test_double_set_is_error() {
    let cell = OneShot::new();
    cell.set(1u8).unwrap();
    assert_eq!(cell.set(2u8), Err(OneShotError));
    // The first value wins
    assert_eq!(*cell.get().await, 1);
}

#[tokio::test]
async fn test_many_consumers() {
    let cell: OneShot<u64> = OneShot::new();

    let mut waiters = Vec::new();
    for _ in 0..8 {
        let cell = cell.clone();
        waiters.push(tokio::spawn(async move { *cell.get().await }));
    }

    cell.set(7).unwrap();

    for waiter in waiters {
        assert_eq!(waiter.await.unwrap(), 7);
    }
}

#[tokio::test]
async fn test_try_get() {
    let cell = OneShot::new();
    assert!(cell.try_get().is_none());
    assert!(!cell.is_set());

    cell.set("ready").unwrap();
    assert!(cell.is_set());
    assert_eq!(*cell.try_get().unwrap(), "ready");
}
