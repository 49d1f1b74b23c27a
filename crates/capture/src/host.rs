// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The host's network-observation surface.
//!
//! The controller registers one listener with the host while capturing; the
//! host then delivers observed requests to the controller. [`LocalHost`] is an
//! in-process host used by the CLI replay and by tests.

use crate::error::HostError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// URL filter matching every request.
pub const ALL_URLS: &str = "<all_urls>";

/// What the registered listener asks the host for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerSpec {
    pub urls: Vec<String>,
    /// Ask for access to request bodies
    pub request_body: bool,
}

impl ListenerSpec {
    /// Every URL, with request bodies
    pub fn all_requests() -> Self {
        Self {
            urls: vec![ALL_URLS.to_string()],
            request_body: true,
        }
    }
}

/// Handle for a registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Registration surface for the privileged network observer.
pub trait NetworkHost: Send + Sync {
    fn add_listener(&self, spec: &ListenerSpec) -> Result<ListenerId, HostError>;

    /// Remove a listener; returns false if it was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;

    fn has_listener(&self, id: ListenerId) -> bool;
}

/// In-process host recording listener registrations.
#[derive(Debug, Default)]
pub struct LocalHost {
    listeners: Mutex<Vec<(ListenerId, ListenerSpec)>>,
    next_id: AtomicU64,
    registrations: AtomicUsize,
    rejecting: AtomicBool,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any listener is registered, i.e. observed events would be
    /// delivered
    pub fn is_listening(&self) -> bool {
        !self.listeners.lock().is_empty()
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Total successful registrations over the host's lifetime
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Filter of the most recently registered listener still active
    pub fn last_spec(&self) -> Option<ListenerSpec> {
        self.listeners.lock().last().map(|(_, spec)| spec.clone())
    }

    /// Make subsequent registrations fail
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }
}

impl NetworkHost for LocalHost {
    fn add_listener(&self, spec: &ListenerSpec) -> Result<ListenerId, HostError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("host is rejecting listeners".into()));
        }
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().push((id, spec.clone()));
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.lock().iter().any(|(registered, _)| *registered == id)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
