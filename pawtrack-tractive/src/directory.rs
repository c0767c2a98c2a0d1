//! Tracker directory lookup.

use pawtrack_core::{Credential, TrackerId};
use pawtrack_fetch::{FetchError, GatewayRequest};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::api::{TractiveApi, expect_ok};

#[derive(Deserialize)]
struct TrackerEntry {
    #[serde(rename = "_id")]
    id: String,
}

/// Lists the trackers registered to the logged-in user.
///
/// Ids are returned in service order with duplicates removed.
///
/// # Errors
///
/// Any transport, timeout, protocol or parse failure is returned as-is.
#[instrument(skip(api, credential), fields(user_id = %credential.user_id))]
pub async fn list_trackers(
    api: &TractiveApi,
    credential: &Credential,
) -> Result<Vec<TrackerId>, FetchError> {
    let request = api.authorized(
        GatewayRequest::get(api.trackers_url(&credential.user_id)),
        credential,
    );

    let body = api.send(request).await.and_then(expect_ok).inspect_err(|e| {
        error!(error = %e, "Error getting tracker list from Tractive");
    })?;

    let entries: Vec<TrackerEntry> = serde_json::from_str(&body)
        .map_err(|e| FetchError::InvalidResponse(format!("tracker list: {e}")))?;

    let mut trackers: Vec<TrackerId> = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = TrackerId::new(entry.id);
        if !trackers.contains(&id) {
            trackers.push(id);
        }
    }

    debug!(count = trackers.len(), "Trackers discovered");
    Ok(trackers)
}
