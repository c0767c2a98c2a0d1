//! In-memory location state.
//!
//! [`LocationStore`] is the default [`LocationSink`]: it keeps the latest
//! update per tracker for the CLI to print. Nothing is written to disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pawtrack_core::{LocationSink, LocationUpdate, TrackerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A published location with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenLocation {
    /// The update as handed to the sink.
    pub update: LocationUpdate,
    /// When the sink received it.
    pub seen_at: DateTime<Utc>,
}

#[derive(Default)]
struct LocationStoreInner {
    latest: HashMap<TrackerId, SeenLocation>,
    /// Trackers in first-seen order.
    order: Vec<TrackerId>,
}

// ============================================================================
// Location Store
// ============================================================================

/// Latest location per tracker.
pub struct LocationStore {
    inner: Arc<RwLock<LocationStoreInner>>,
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LocationStoreInner::default())),
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Latest location of a tracker.
    pub async fn get(&self, tracker: &TrackerId) -> Option<SeenLocation> {
        self.inner.read().await.latest.get(tracker).cloned()
    }

    /// Latest location of every tracker, in first-seen order.
    pub async fn all(&self) -> Vec<SeenLocation> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.latest.get(id).cloned())
            .collect()
    }

    /// Number of trackers with a known location.
    pub async fn len(&self) -> usize {
        self.inner.read().await.latest.len()
    }

    /// Returns true if nothing has been published yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.latest.is_empty()
    }

    /// Records an update, replacing the previous one for the same tracker.
    pub async fn record(&self, update: LocationUpdate) {
        let tracker = update.device_id.clone();
        let seen_at = Utc::now();
        let mut inner = self.inner.write().await;
        if !inner.latest.contains_key(&tracker) {
            inner.order.push(tracker.clone());
        }
        inner
            .latest
            .insert(tracker.clone(), SeenLocation { update, seen_at });
        debug!(tracker = %tracker, "Location updated");
    }
}

#[async_trait]
impl LocationSink for LocationStore {
    async fn see(&self, update: LocationUpdate) {
        self.record(update).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
