// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture on/off state and routing of producer events into the store.
//!
//! Every entry point first waits on a one-time readiness gate that restores
//! the persisted snapshot, so no event is applied to a store that is about
//! to be overwritten.

use crate::clock::ClockHandle;
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::host::{ListenerId, ListenerSpec, NetworkHost};
use crate::producer::{
    is_post, Ingest, ObservedRequest, ObserverProducer, PageProducer, PageRequest, Pipeline,
    Producer, SkipReason,
};
use crate::record::{CapturedRequest, OriginId, PendingRequest};
use crate::store::CaptureStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Routes captured requests from both producers into a [`CaptureStore`].
pub struct CaptureController {
    config: CaptureConfig,
    store: Arc<CaptureStore>,
    host: Arc<dyn NetworkHost>,
    pipeline: Arc<Pipeline>,
    observer: ObserverProducer,
    page: PageProducer,
    listener: Mutex<Option<ListenerId>>,
    ready: OnceCell<()>,
}

impl CaptureController {
    pub fn new(
        config: CaptureConfig,
        store: Arc<CaptureStore>,
        host: Arc<dyn NetworkHost>,
        clock: ClockHandle,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::new(&config, clock));
        Self {
            observer: ObserverProducer::new(Arc::clone(&pipeline)),
            page: PageProducer::new(Arc::clone(&pipeline)),
            pipeline,
            config,
            store,
            host,
            listener: Mutex::new(None),
            ready: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<CaptureStore> {
        &self.store
    }

    /// The in-page producer, for hooks that decode before handing off
    pub fn page_producer(&self) -> &PageProducer {
        &self.page
    }

    /// Wait until the persisted snapshot has been restored.
    ///
    /// The first caller performs the restore on the blocking pool;
    /// concurrent callers queue behind it.
    pub async fn ready(&self) {
        self.ready
            .get_or_init(|| async {
                let store = Arc::clone(&self.store);
                let restore = tokio::task::spawn_blocking(move || store.load_persisted());
                if let Err(error) = restore.await {
                    tracing::error!(%error, "snapshot restore did not complete");
                }
            })
            .await;
    }

    /// Process start: restore state, then begin capturing if configured.
    pub async fn launch(&self) -> Result<(), CaptureError> {
        self.ready().await;
        if self.config.start_on_launch {
            self.start()?;
        }
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Register the network observer. No-op while already capturing.
    pub fn start(&self) -> Result<(), CaptureError> {
        let mut listener = self.listener.lock();
        if listener.is_some() {
            return Ok(());
        }
        *listener = Some(self.host.add_listener(&ListenerSpec::all_requests())?);
        tracing::info!("network capture started");
        Ok(())
    }

    /// Deregister the network observer. No-op while already stopped.
    pub fn stop(&self) {
        let Some(id) = self.listener.lock().take() else {
            return;
        };
        if !self.host.remove_listener(id) {
            tracing::warn!(?id, "observer was already gone from the host");
        }
        tracing::info!("network capture stopped");
    }

    /// Privileged observer entry point.
    pub async fn handle_observed(&self, event: &ObservedRequest) -> Ingest {
        self.ready().await;
        let ingest = self.observer.ingest(event.origin(), event);
        self.settle(&event.url, ingest)
    }

    /// In-page hook entry point when the hook runs in-process.
    pub async fn handle_page_request(
        &self,
        origin: Option<OriginId>,
        event: &PageRequest,
    ) -> Result<Ingest, CaptureError> {
        self.ready().await;
        let Some(origin) = origin else {
            tracing::warn!(url = %event.url, "page request without an origin");
            return Err(CaptureError::NoOrigin);
        };
        let ingest = self.page.ingest(Some(origin), event);
        Ok(self.settle(&event.url, ingest))
    }

    /// Accept a request the in-page producer already decoded.
    ///
    /// Fails when the sender has no origin; the record is never placed in
    /// another origin's buffer.
    pub async fn ingest_intercepted_request(
        &self,
        origin: Option<OriginId>,
        pending: PendingRequest,
    ) -> Result<Ingest, CaptureError> {
        self.ready().await;
        let Some(origin) = origin else {
            tracing::warn!(url = %pending.url, "intercepted request without an origin");
            return Err(CaptureError::NoOrigin);
        };

        let url = pending.url.clone();
        let ingest = if !is_post(&pending.method) {
            Ingest::Skipped(SkipReason::NotPost)
        } else if !self
            .config
            .retention
            .retains(pending.is_target_endpoint, pending.decoded_fields.len())
        {
            Ingest::Skipped(SkipReason::NotRetained)
        } else {
            Ingest::Captured(self.pipeline.bind(pending, origin))
        };
        Ok(self.settle(&url, ingest))
    }

    /// Read an origin's records, starting capture first when configured to.
    pub async fn get_captured_requests(&self, origin: OriginId) -> Vec<CapturedRequest> {
        self.ready().await;
        if self.config.auto_start_on_read && !self.is_capturing() {
            if let Err(error) = self.start() {
                tracing::warn!(%error, "auto-start on read failed");
            }
        }
        self.store.list(origin)
    }

    pub async fn clear_requests(&self, origin: OriginId) {
        self.ready().await;
        self.store.clear(origin);
    }

    /// The origin's context was torn down.
    pub async fn origin_removed(&self, origin: OriginId) {
        self.ready().await;
        self.store.remove(origin);
    }

    fn settle(&self, url: &str, ingest: Ingest) -> Ingest {
        match &ingest {
            Ingest::Captured(record) => {
                self.store.append(record.origin, record.clone());
                self.store
                    .notifier()
                    .notify_new_request(record.origin, record);
            }
            Ingest::Skipped(reason) => {
                tracing::trace!(url, ?reason, "request skipped");
            }
        }
        ingest
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
