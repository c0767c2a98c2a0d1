//! Trait definitions for pawtrack.
//!
//! The scanner never owns the place locations end up in; it only knows the
//! [`LocationSink`] seam.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::LocationUpdate;

/// Receiver for published tracker locations.
///
/// Publication is fire-and-forget: implementors must not fail the caller.
/// Anything that can go wrong inside the sink is the sink's own business
/// to log.
#[async_trait]
pub trait LocationSink: Send + Sync {
    /// Records a new location for a tracker.
    async fn see(&self, update: LocationUpdate);
}

#[async_trait]
impl<T: LocationSink + ?Sized> LocationSink for Arc<T> {
    async fn see(&self, update: LocationUpdate) {
        (**self).see(update).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FusedRecord, TrackerId, DEFAULT_ICON};
    use chrono::{TimeZone, Utc};
    use serde_json::Map;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<LocationUpdate>>,
    }

    #[async_trait]
    impl LocationSink for RecordingSink {
        async fn see(&self, update: LocationUpdate) {
            self.seen.lock().unwrap().push(update);
        }
    }

    #[tokio::test]
    async fn test_arc_sink_forwards() {
        let sink = Arc::new(RecordingSink::default());
        let shared: Arc<dyn LocationSink> = sink.clone();

        let record = FusedRecord {
            latitude: 1.0,
            longitude: 2.0,
            source_type: "GPS".to_string(),
            battery: Some(50),
            time: Utc.timestamp_opt(0, 0).unwrap(),
            attributes: Map::new(),
        };
        shared
            .see(LocationUpdate::from_record(TrackerId::from("T1"), record))
            .await;

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].gps, (1.0, 2.0));
        assert_eq!(seen[0].icon, DEFAULT_ICON);
    }
}
