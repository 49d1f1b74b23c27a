// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `statlens replay`: drive the capture pipeline from a recorded event log.
//!
//! Each line of the log is one host event. Observed requests are delivered
//! only while the controller's listener is registered with the host, just as
//! a real host would stop calling a removed listener. Page events run the
//! in-page producer and cross the runtime message boundary with the tab as
//! sender.

use crate::cli::ReplayArgs;
use crate::config::{self, ConfigError};
use crate::output::{collect_reports, print_warning, write_reports};
use serde::Deserialize;
use statlens_capture::message::{dispatch, dispatch_json};
use statlens_capture::{
    CaptureConfig, CaptureController, CaptureError, CaptureEvent, CaptureStore, ClockHandle, Ingest,
    JsonFileStore, LocalHost, NetworkHost, Notifier, ObservedRequest, OriginId, PageRequest,
    PersistError, RuntimeMessage, RuntimeResponse, SnapshotStore,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read events from '{path}': {source}")]
    Events {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Failed to write snapshot: {0}")]
    Persist(#[from] PersistError),

    #[error("Failed to read events: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// One recorded host event.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// The network observer saw a request
    Observed(ObservedRequest),

    /// A hooked XHR/fetch call in a tab's page
    Page {
        #[serde(rename = "tabId")]
        tab_id: Option<OriginId>,
        request: PageRequest,
    },

    /// A raw runtime message
    Message {
        #[serde(default)]
        sender: Option<OriginId>,
        message: serde_json::Value,
    },

    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: OriginId,
    },

    Start,

    Stop,
}

/// Counters reported after a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: usize,
    pub captured: usize,
    pub skipped: usize,
    /// Observed requests dropped because no listener was registered
    pub undelivered: usize,
    /// Messages answered with `success: false`
    pub failures: usize,
}

/// A controller wired to an in-process host.
pub struct Replay {
    controller: CaptureController,
    host: Arc<LocalHost>,
    events: broadcast::Receiver<CaptureEvent>,
    stats: ReplayStats,
}

impl Replay {
    pub fn new(config: CaptureConfig, backend: Option<Arc<dyn SnapshotStore>>) -> Self {
        Self::with_clock(config, backend, ClockHandle::system())
    }

    pub fn with_clock(
        config: CaptureConfig,
        backend: Option<Arc<dyn SnapshotStore>>,
        clock: ClockHandle,
    ) -> Self {
        let mut store = CaptureStore::new(config.capacity, Notifier::new());
        if let Some(backend) = backend {
            store = store.with_persistence(backend, config.snapshot_key.clone(), config.debounce());
        }

        let events = store.notifier().subscribe();
        let host = Arc::new(LocalHost::new());
        let controller = CaptureController::new(
            config,
            Arc::new(store),
            Arc::clone(&host) as Arc<dyn NetworkHost>,
            clock,
        );
        Self {
            controller,
            host,
            events,
            stats: ReplayStats::default(),
        }
    }

    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    pub fn host(&self) -> &LocalHost {
        &self.host
    }

    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }

    /// Restore the snapshot and start capturing if configured.
    pub async fn launch(&self) -> Result<(), ReplayError> {
        self.controller.launch().await?;
        Ok(())
    }

    pub async fn apply(&mut self, event: HostEvent) {
        self.stats.events += 1;
        self.dispatch_event(event).await;
        self.drain_events();
    }

    async fn dispatch_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Observed(request) => {
                if !self.host.is_listening() {
                    tracing::debug!(url = %request.url, "no listener registered, request not delivered");
                    self.stats.undelivered += 1;
                    return;
                }
                if let Ingest::Skipped(_) = self.controller.handle_observed(&request).await {
                    self.stats.skipped += 1;
                }
            }
            HostEvent::Page { tab_id, request } => self.apply_page(tab_id, &request).await,
            HostEvent::Message { sender, message } => {
                let reply = dispatch_json(&self.controller, &message.to_string(), sender).await;
                self.answer(reply);
            }
            HostEvent::TabRemoved { tab_id } => self.controller.origin_removed(tab_id).await,
            HostEvent::Start => {
                let reply = dispatch(&self.controller, RuntimeMessage::StartCapture, None).await;
                self.answer(reply);
            }
            HostEvent::Stop => {
                let reply = dispatch(&self.controller, RuntimeMessage::StopCapture, None).await;
                self.answer(reply);
            }
        }
    }

    /// Decode in the page, then hand the result across the message boundary.
    async fn apply_page(&mut self, tab_id: Option<OriginId>, request: &PageRequest) {
        match self.controller.page_producer().decode(request) {
            Ok(pending) => {
                let message = RuntimeMessage::InterceptedRequest { request: pending };
                let reply = dispatch(&self.controller, message, tab_id).await;
                self.answer(reply);
            }
            Err(reason) => {
                tracing::trace!(url = %request.url, ?reason, "page request skipped");
                self.stats.skipped += 1;
            }
        }
    }

    /// Read every event from `reader`, stopping at the first malformed line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<(), ReplayError> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await.map_err(ReplayError::Read)? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event: HostEvent = serde_json::from_str(line).map_err(|source| {
                ReplayError::Parse {
                    line: line_no,
                    source,
                }
            })?;
            self.apply(event).await;
        }
        Ok(())
    }

    /// Write the snapshot now instead of waiting for the debounce window.
    pub async fn finish(&self) -> Result<(), ReplayError> {
        let store = Arc::clone(self.controller.store());
        tokio::task::spawn_blocking(move || store.flush())
            .await
            .map_err(|error| PersistError::Unavailable(error.to_string()))??;
        Ok(())
    }

    /// Count the records announced since the last event.
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(CaptureEvent::NewRequest { .. }) => self.stats.captured += 1,
                Ok(CaptureEvent::BadgeChanged { .. }) => {}
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "replay fell behind capture events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn answer(&mut self, reply: RuntimeResponse) {
        if let RuntimeResponse::Ack {
            success: false,
            error,
        } = &reply
        {
            tracing::warn!(error = error.as_deref().unwrap_or("unknown"), "message failed");
            self.stats.failures += 1;
        }
    }
}

pub async fn run<W: Write>(args: &ReplayArgs, out: &mut W) -> Result<(), ReplayError> {
    let config = config::resolve(&args.config)?;
    let backend = args
        .snapshot
        .as_ref()
        .map(|path| Arc::new(JsonFileStore::new(path)) as Arc<dyn SnapshotStore>);

    let mut replay = Replay::new(config, backend);
    replay.launch().await?;

    let file = open_events(&args.events).await?;
    let result = replay.run(BufReader::new(file)).await;

    // Whatever was captured before a bad line still gets written.
    if args.snapshot.is_some() {
        if let Err(error) = replay.finish().await {
            if result.is_ok() {
                return Err(error);
            }
            print_warning(error);
        }
    }
    result?;

    let stats = replay.stats();
    tracing::info!(
        events = stats.events,
        captured = stats.captured,
        skipped = stats.skipped,
        undelivered = stats.undelivered,
        failures = stats.failures,
        "replay finished"
    );

    let reports = collect_reports(replay.controller().store().snapshot(), args.origin);
    write_reports(out, &reports, args.output_format).map_err(ReplayError::Output)?;
    Ok(())
}

async fn open_events(path: &Path) -> Result<tokio::fs::File, ReplayError> {
    tokio::fs::File::open(path)
        .await
        .map_err(|source| ReplayError::Events {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
