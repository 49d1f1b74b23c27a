// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting(window_ms: u64) -> (Debouncer, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let flushes = Arc::clone(&count);
    let debouncer = Debouncer::spawn(Duration::from_millis(window_ms), move || {
        flushes.fetch_add(1, Ordering::SeqCst);
    });
    (debouncer, count)
}

/// Let the debounce task observe queued triggers and elapsed timers.
async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_burst_coalesces_into_one_flush() {
    let (debouncer, count) = counting(300);

    for _ in 0..10 {
        debouncer.trigger();
    }
    settle(299).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    settle(10).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_restarts_window() {
    let (debouncer, count) = counting(300);

    debouncer.trigger();
    settle(200).await;
    debouncer.trigger();
    settle(200).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    settle(150).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_flush_separately() {
    let (debouncer, count) = counting(300);

    debouncer.trigger();
    settle(400).await;
    debouncer.trigger();
    settle(400).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_flushes_pending() {
    let (debouncer, count) = counting(300);

    debouncer.trigger();
    tokio::task::yield_now().await;
    drop(debouncer);
    settle(1).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_runs_on_blocking_pool() {
    let caller = std::thread::current().id();
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let slot = Arc::clone(&seen);
    let debouncer = Debouncer::spawn(Duration::from_millis(300), move || {
        *slot.lock() = Some(std::thread::current().id());
    });

    debouncer.trigger();
    settle(350).await;

    let flushed_on = (*seen.lock()).unwrap();
    assert_ne!(flushed_on, caller);
}

#[test]
fn test_without_runtime_flushes_immediately() {
    let (debouncer, count) = counting(300);
    debouncer.trigger();
    debouncer.trigger();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}
