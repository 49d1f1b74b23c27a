// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trailing-edge debouncing of a flush action.
//!
//! Every trigger restarts the window; the action runs once the window has
//! passed with no further triggers. Callers never wait on the action, and
//! under a runtime it runs on the blocking pool so it may do file I/O.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type FlushFn = Arc<dyn Fn() + Send + Sync>;

pub struct Debouncer {
    mode: Mode,
}

enum Mode {
    /// Triggers are forwarded to a timer task.
    Task(mpsc::UnboundedSender<()>),
    /// No runtime was available at construction; flush on every trigger.
    Immediate(FlushFn),
}

impl Debouncer {
    /// Start a debouncer running `flush` after `window` of quiet.
    ///
    /// Must be called from within a tokio runtime to get debouncing;
    /// otherwise every trigger flushes synchronously.
    pub fn spawn<F>(window: Duration, flush: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let flush: FlushFn = Arc::new(flush);
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime, persistence will not be debounced");
            return Self {
                mode: Mode::Immediate(flush),
            };
        };

        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run(window, rx, flush));
        Self {
            mode: Mode::Task(tx),
        }
    }

    pub fn trigger(&self) {
        match &self.mode {
            Mode::Task(tx) => {
                if tx.send(()).is_err() {
                    tracing::warn!("debounce task has stopped, trigger dropped");
                }
            }
            Mode::Immediate(flush) => flush(),
        }
    }
}

async fn run(window: Duration, mut rx: mpsc::UnboundedReceiver<()>, flush: FlushFn) {
    while rx.recv().await.is_some() {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(()) => continue,
                    None => {
                        // Owner dropped with a flush pending.
                        flush_blocking(&flush).await;
                        return;
                    }
                },
                _ = tokio::time::sleep(window) => break,
            }
        }
        flush_blocking(&flush).await;
    }
}

async fn flush_blocking(flush: &FlushFn) {
    let flush = Arc::clone(flush);
    if let Err(error) = tokio::task::spawn_blocking(move || flush()).await {
        tracing::error!(%error, "debounced flush did not complete");
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
