//! Alert ingestion.
//!
//! A single task owns the [`AlertStore`] and applies [`FeedEvent`]s from an
//! mpsc channel in arrival order. After every change it publishes a fresh
//! [`SiteSnapshot`] on a watch channel; views only ever read snapshots.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::entities::{AlertRecord, AlertStatus};
use crate::error::{Error, Result};
use crate::metrics;
use crate::store::{AlertStore, ConnectionState, SiteSnapshot, StoreChange};

#[derive(Debug)]
pub enum FeedEvent {
    /// Complete record from the ingestion feed, new or updated.
    Upsert(AlertRecord),
    /// Operator action (acknowledge, resolve, mark false positive).
    Transition {
        id: String,
        to: AlertStatus,
        reply: oneshot::Sender<Result<AlertRecord>>,
    },
    Disconnected { reason: String },
    Reconnected,
}

impl FeedEvent {
    /// Whether this event proves the upstream feed is alive.
    fn is_feed_traffic(&self) -> bool {
        match self {
            FeedEvent::Upsert(_) | FeedEvent::Reconnected => true,
            FeedEvent::Transition { .. } | FeedEvent::Disconnected { .. } => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FeedHandle {
    tx: mpsc::Sender<FeedEvent>,
}

impl FeedHandle {
    async fn send(&self, event: FeedEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| Error::DataUnavailable("ingest task is not running".into()))
    }

    /// Queues a record. Validation happens in the ingest task; rejects are logged there.
    pub async fn ingest(&self, record: AlertRecord) -> Result<()> {
        record.validate()?;
        self.send(FeedEvent::Upsert(record)).await
    }

    pub async fn transition(&self, id: impl Into<String>, to: AlertStatus) -> Result<AlertRecord> {
        let (reply, rx) = oneshot::channel();
        self.send(FeedEvent::Transition {
            id: id.into(),
            to,
            reply,
        })
        .await?;
        rx.await
            .map_err(|_| Error::DataUnavailable("ingest task dropped the request".into()))?
    }

    pub async fn disconnected(&self, reason: impl Into<String>) -> Result<()> {
        self.send(FeedEvent::Disconnected {
            reason: reason.into(),
        })
        .await
    }

    pub async fn reconnected(&self) -> Result<()> {
        self.send(FeedEvent::Reconnected).await
    }
}

pub struct IngestService {
    pub handle: FeedHandle,
    pub snapshots: watch::Receiver<Arc<SiteSnapshot>>,
    /// Resolves with the final store once every `FeedHandle` is dropped.
    pub task: JoinHandle<AlertStore>,
}

pub fn spawn_ingest(store: AlertStore, config: &FeedConfig) -> IngestService {
    let (tx, rx) = mpsc::channel::<FeedEvent>(config.channel_capacity);
    let (snapshot_tx, snapshots) = watch::channel(Arc::new(store.snapshot()));

    let task = tokio::spawn(run_ingest(store, rx, snapshot_tx, config.stale_after));

    IngestService {
        handle: FeedHandle { tx },
        snapshots,
        task,
    }
}

async fn run_ingest(
    mut store: AlertStore,
    mut rx: mpsc::Receiver<FeedEvent>,
    snapshot_tx: watch::Sender<Arc<SiteSnapshot>>,
    stale_after: std::time::Duration,
) -> AlertStore {
    info!("Ingest task started with {} alerts", store.len());
    let mut last_feed = Instant::now();

    loop {
        let before = store.version();
        let mut reply = None;
        // No deadline when the window does not fit in the clock.
        let stale_at = last_feed.checked_add(stale_after);

        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if event.is_feed_traffic() {
                    last_feed = Instant::now();
                }
                reply = apply_event(&mut store, event);
            }
            _ = tokio::time::sleep_until(stale_at.unwrap_or(last_feed)), if stale_at.is_some() && store.connection().is_live() => {
                warn!("No feed traffic for {:?}, marking data stale", stale_after);
                store.set_connection(ConnectionState::Stale { since: Utc::now() });
            }
        }

        if store.version() != before {
            let snapshot = store.snapshot();
            metrics::record_snapshot(&snapshot);
            debug!(version = snapshot.version, "Publishing snapshot");
            snapshot_tx.send_replace(Arc::new(snapshot));
        }

        // Answer operators only once their change is visible to readers.
        if let Some((tx, result)) = reply {
            if tx.send(result).is_err() {
                debug!("Transition requester went away");
            }
        }
    }

    info!("Feed channel closed, ingest task stopping");
    store
}

type PendingReply = (oneshot::Sender<Result<AlertRecord>>, Result<AlertRecord>);

fn apply_event(store: &mut AlertStore, event: FeedEvent) -> Option<PendingReply> {
    match event {
        FeedEvent::Upsert(record) => {
            let id = record.id.clone();
            match store.upsert(record) {
                Ok(change) => {
                    let label = match change {
                        StoreChange::Inserted => "inserted",
                        StoreChange::Updated => "updated",
                        StoreChange::Unchanged => "unchanged",
                    };
                    debug!(alert_id = %id, change = label, "Applied feed record");
                    metrics::increment_alerts_ingested(label);
                }
                Err(e) => {
                    warn!(alert_id = %id, "Rejected feed record: {}", e);
                    metrics::increment_alerts_rejected(e.code());
                }
            }
            mark_live(store);
        }
        FeedEvent::Transition { id, to, reply } => {
            let result = store.transition(&id, to, Utc::now());
            match &result {
                Ok(_) => {
                    info!(alert_id = %id, to = %to, "Alert status changed");
                    metrics::increment_transitions(to);
                }
                Err(e) => warn!(alert_id = %id, to = %to, "Transition refused: {}", e),
            }
            return Some((reply, result));
        }
        FeedEvent::Disconnected { reason } => {
            warn!("Alert feed disconnected: {}", reason);
            store.set_connection(ConnectionState::Down {
                since: Utc::now(),
                reason,
            });
        }
        FeedEvent::Reconnected => mark_live(store),
    }
    None
}

fn mark_live(store: &mut AlertStore) {
    if store.set_connection(ConnectionState::Live) {
        info!("Alert feed is live again");
    }
}
