//! Authoritative in-memory alert store.
//!
//! Only the ingest task in [`crate::feed`] holds a mutable `AlertStore`.
//! Everyone else reads immutable [`SiteSnapshot`]s.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{AlertRecord, AlertStatus};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Live,
    /// No feed traffic for longer than the configured window.
    Stale { since: DateTime<Utc> },
    Down { since: DateTime<Utc>, reason: String },
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Live => "NETWORK: STABLE",
            ConnectionState::Stale { .. } => "NETWORK: STALE",
            ConnectionState::Down { .. } => "NETWORK: DOWN",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Inserted,
    Updated,
    Unchanged,
}

/// Point-in-time view of the store handed to readers.
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    pub version: u64,
    pub taken_at: DateTime<Utc>,
    pub connection: ConnectionState,
    /// Newest first.
    pub alerts: Arc<Vec<AlertRecord>>,
}

impl SiteSnapshot {
    pub fn find(&self, id: &str) -> Option<&AlertRecord> {
        self.alerts.iter().find(|a| a.id == id)
    }
}

#[derive(Debug)]
pub struct AlertStore {
    records: HashMap<String, AlertRecord>,
    connection: ConnectionState,
    version: u64,
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStore {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            connection: ConnectionState::Live,
            version: 0,
        }
    }

    pub fn with_records(records: impl IntoIterator<Item = AlertRecord>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.upsert(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<&AlertRecord> {
        self.records.get(id)
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Inserts a new record or refreshes an existing one.
    ///
    /// For a known id the incoming status must equal the stored one or be a
    /// single legal step forward, and `occurred_at` must not change.
    pub fn upsert(&mut self, incoming: AlertRecord) -> Result<StoreChange> {
        incoming.validate()?;

        let Some(current) = self.records.get_mut(&incoming.id) else {
            self.records.insert(incoming.id.clone(), incoming);
            self.version += 1;
            return Ok(StoreChange::Inserted);
        };

        if current.occurred_at != incoming.occurred_at {
            return Err(Error::MalformedRecord(format!(
                "alert {} changed occurred_at from {} to {}",
                incoming.id, current.occurred_at, incoming.occurred_at
            )));
        }
        if current.status != incoming.status && !current.status.can_advance_to(incoming.status) {
            return Err(Error::InvalidTransition {
                id: incoming.id,
                from: current.status,
                to: incoming.status,
            });
        }
        if *current == incoming {
            return Ok(StoreChange::Unchanged);
        }

        *current = incoming;
        self.version += 1;
        Ok(StoreChange::Updated)
    }

    pub fn transition(&mut self, id: &str, next: AlertStatus, at: DateTime<Utc>) -> Result<AlertRecord> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("alert {}", id)))?;
        record.transition(next, at)?;
        self.version += 1;
        Ok(record.clone())
    }

    pub fn set_connection(&mut self, connection: ConnectionState) -> bool {
        if self.connection == connection {
            return false;
        }
        self.connection = connection;
        self.version += 1;
        true
    }

    /// Records sorted by `occurred_at` descending, ties by id descending.
    pub fn records(&self) -> Vec<AlertRecord> {
        let mut records: Vec<AlertRecord> = self.records.values().cloned().collect();
        sort_newest_first(&mut records);
        records
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            version: self.version,
            taken_at: Utc::now(),
            connection: self.connection.clone(),
            alerts: Arc::new(self.records()),
        }
    }
}

pub fn sort_newest_first(records: &mut [AlertRecord]) {
    records.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
