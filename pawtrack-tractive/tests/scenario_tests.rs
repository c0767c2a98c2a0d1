//! End-to-end scanner scenarios against a scripted Tractive service.

use async_trait::async_trait;
use pawtrack_core::{LocationSink, LocationUpdate, TrackerId};
use pawtrack_fetch::host::scripted::{Reply, ScriptedGateway};
use pawtrack_fetch::{FetchContext, Method};
use pawtrack_tractive::{
    CredentialManager, Rejection, Scanner, ScannerError, ScannerOptions, ScannerState,
    TractiveApi, TrackerOutcome,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<LocationUpdate>>,
}

impl RecordingSink {
    fn seen(&self) -> Vec<LocationUpdate> {
        self.seen.lock().unwrap().clone()
    }

    fn ids(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .map(|u| u.device_id.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl LocationSink for RecordingSink {
    async fn see(&self, update: LocationUpdate) {
        self.seen.lock().unwrap().push(update);
    }
}

fn token(access: &str) -> Reply {
    Reply::ok(json!({"user_id": "u1", "access_token": access}).to_string())
}

fn trackers(ids: &[&str]) -> Reply {
    let list: Vec<_> = ids.iter().map(|id| json!({"_id": id, "_type": "tracker"})).collect();
    Reply::ok(serde_json::Value::Array(list).to_string())
}

fn positions(uncertainty: u32) -> Reply {
    Reply::ok(
        json!([[
            {"latlong": [47.0, 15.0], "pos_uncertainty": 900, "sensor_used": "GPS", "time": 1_700_000_000},
            {"latlong": [48.2, 16.37], "pos_uncertainty": uncertainty, "sensor_used": "GPS", "time": 1_700_000_300}
        ]])
        .to_string(),
    )
}

fn hardware(battery: u8) -> Reply {
    Reply::ok(
        json!({
            "_id": "hw",
            "_type": "device_hw_report",
            "report_id": "r1",
            "time": 1_700_000_100,
            "battery_level": battery
        })
        .to_string(),
    )
}

/// Gateway with a working login and two trackers, T1 and T2.
fn service() -> ScriptedGateway {
    ScriptedGateway::new()
        .on(Method::Post, "/auth/token", token("tok1"))
        .on(Method::Get, "/user/u1/trackers", trackers(&["T1", "T2"]))
        .on(Method::Get, "/device_hw_report/T2/", hardware(55))
        .on(Method::Get, "/tracker/T2/positions", positions(20))
}

fn scanner(gateway: Arc<ScriptedGateway>, sink: Arc<RecordingSink>, max: f64) -> Scanner {
    let api = TractiveApi::new(FetchContext::builder().http(gateway).build());
    let auth = CredentialManager::new("cat@example.com", "hunter2");
    Scanner::new(
        api,
        auth,
        sink,
        ScannerOptions {
            max_gps_accuracy: max,
        },
    )
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn login_rejected_keeps_scanner_unauthenticated() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .on(Method::Post, "/auth/token", Reply::status(401))
            .on(Method::Get, "/trackers", trackers(&["T1"])),
    );
    let mut scanner = scanner(gateway.clone(), Arc::default(), 100.0);

    let err = scanner.start().await.unwrap_err();
    assert!(matches!(err, ScannerError::Login(_)));
    assert!(!err.is_fatal());
    assert_eq!(scanner.state(), &ScannerState::Unauthenticated);
    assert_eq!(gateway.count(Method::Get, "/trackers"), 0);
}

#[tokio::test]
async fn unreachable_service_is_fatal_at_startup() {
    let gateway = Arc::new(ScriptedGateway::new().on(
        Method::Post,
        "/auth/token",
        Reply::Transport("connection refused".into()),
    ));
    let mut scanner = scanner(gateway, Arc::default(), 100.0);

    let err = scanner.start().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(!scanner.is_authenticated());
}

#[tokio::test]
async fn directory_failure_keeps_scanner_unauthenticated() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .on(Method::Post, "/auth/token", token("tok1"))
            .on(Method::Get, "/trackers", Reply::status(500)),
    );
    let mut scanner = scanner(gateway, Arc::default(), 100.0);

    let err = scanner.start().await.unwrap_err();
    assert!(matches!(err, ScannerError::Directory(_)));
    assert!(scanner.trackers().is_empty());
}

#[tokio::test]
async fn start_resolves_trackers_once() {
    let gateway = Arc::new(service());
    let mut scanner = scanner(gateway.clone(), Arc::default(), 100.0);

    let found = scanner.start().await.unwrap().to_vec();
    assert_eq!(found, vec![TrackerId::from("T1"), TrackerId::from("T2")]);

    scanner.start().await.unwrap();
    assert_eq!(gateway.count(Method::Post, "/auth/token"), 1);
    assert_eq!(gateway.count(Method::Get, "/trackers"), 1);
}

#[tokio::test]
async fn cycle_before_start_does_nothing() {
    let gateway = Arc::new(service());
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);

    let report = scanner.run_cycle().await;
    assert!(report.is_empty());
    assert!(sink.seen().is_empty());
    assert!(gateway.requests().is_empty());
}

// ============================================================================
// Update Cycle
// ============================================================================

#[tokio::test]
async fn positions_timing_out_twice_skips_tracker() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", Reply::Timeout),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(sink.ids(), vec!["T2"]);
    assert_eq!(
        report.outcome(&TrackerId::from("T1")),
        Some(&TrackerOutcome::NoData)
    );
    assert_eq!(gateway.count(Method::Get, "/tracker/T1/positions"), 2);
    // startup login plus one re-login for T1
    assert_eq!(gateway.count(Method::Post, "/auth/token"), 2);
}

#[tokio::test]
async fn accurate_point_is_published_with_battery() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", positions(50)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway, sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;
    assert_eq!(report.published(), 2);

    let seen = sink.seen();
    let t1 = &seen[0];
    assert_eq!(t1.device_id, TrackerId::from("T1"));
    assert_eq!(t1.gps, (48.2, 16.37));
    assert_eq!(t1.battery, Some(80));
    assert_eq!(t1.source_type, "GPS");
    assert_eq!(t1.icon, "mdi:cat");
    assert_eq!(t1.attributes["time"], json!("2023-11-14T22:18:20Z"));
    assert!(!t1.attributes.contains_key("_id"));
    assert!(!t1.attributes.contains_key("latlong"));
}

#[tokio::test]
async fn inaccurate_point_is_rejected() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", positions(150)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway, sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(sink.ids(), vec!["T2"]);
    assert_eq!(
        report.outcome(&TrackerId::from("T1")),
        Some(&TrackerOutcome::Rejected(Rejection::LowAccuracy {
            uncertainty: 150.0,
            max: 100.0
        }))
    );
}

#[tokio::test]
async fn hardware_failure_still_publishes() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", Reply::status(500))
            .on(Method::Get, "/tracker/T1/positions", positions(10)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway, sink.clone(), 100.0);
    scanner.start().await.unwrap();

    scanner.run_cycle().await;

    let seen = sink.seen();
    assert_eq!(seen[0].device_id, TrackerId::from("T1"));
    assert_eq!(seen[0].battery, None);
    assert_eq!(seen[0].gps, (48.2, 16.37));
    assert!(!seen[0].attributes.contains_key("battery_level"));
}

#[tokio::test]
async fn expired_token_is_refreshed_within_the_cycle() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .on(Method::Post, "/auth/token", token("stale"))
            .on(Method::Post, "/auth/token", token("fresh"))
            .on(Method::Get, "/user/u1/trackers", trackers(&["T1"]))
            .on(Method::Get, "/device_hw_report/T1/", hardware(70))
            .on(Method::Get, "/tracker/T1/positions", Reply::status(401))
            .on(Method::Get, "/tracker/T1/positions", positions(10)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;
    assert_eq!(report.published(), 1);

    let auth: Vec<String> = gateway
        .requests()
        .iter()
        .filter(|r| r.url.contains("/positions"))
        .filter_map(|r| r.header_value("authorization").map(str::to_string))
        .collect();
    assert_eq!(auth, vec!["Bearer stale", "Bearer fresh"]);

    match scanner.state() {
        ScannerState::Authenticated { credential, .. } => {
            assert_eq!(credential.access_token, "fresh");
        }
        ScannerState::Unauthenticated => panic!("scanner lost its credential"),
    }
}

#[tokio::test]
async fn failed_relogin_still_retries_with_current_token() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .on(Method::Post, "/auth/token", token("tok1"))
            .on(Method::Post, "/auth/token", Reply::status(503))
            .on(Method::Get, "/user/u1/trackers", trackers(&["T1"]))
            .on(Method::Get, "/device_hw_report/T1/", hardware(70))
            .on(Method::Get, "/tracker/T1/positions", Reply::Timeout)
            .on(Method::Get, "/tracker/T1/positions", positions(10)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(report.published(), 1);
    let last = gateway
        .requests()
        .into_iter()
        .filter(|r| r.url.contains("/positions"))
        .last()
        .unwrap();
    assert_eq!(last.header_value("authorization"), Some("Bearer tok1"));
}

#[tokio::test]
async fn transport_failure_is_contained_to_one_tracker() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(
                Method::Get,
                "/tracker/T1/positions",
                Reply::Transport("connection reset".into()),
            ),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(report.failed(), 1);
    assert_eq!(sink.ids(), vec!["T2"]);
    assert_eq!(gateway.count(Method::Get, "/tracker/T1/positions"), 1);
}

#[tokio::test]
async fn empty_segment_is_rejected_without_retry() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", Reply::ok("[[]]")),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(
        report.outcome(&TrackerId::from("T1")),
        Some(&TrackerOutcome::Rejected(Rejection::NoPoints))
    );
    assert_eq!(gateway.count(Method::Post, "/auth/token"), 1);
}

#[tokio::test]
async fn malformed_points_outside_newest_are_tolerated() {
    let body = json!([
        [
            {"latlong": [47.0, 15.0], "pos_uncertainty": null, "sensor_used": "GPS", "time": 1_700_000_000},
            {"latlong": [48.2, 16.37], "pos_uncertainty": 12, "sensor_used": "GPS", "time": 1_700_000_300}
        ],
        [
            {"latlong": [49.0, 17.0], "pos_uncertainty": 5, "time": 1_700_000_600}
        ]
    ]);
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", Reply::ok(body.to_string())),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway.clone(), sink.clone(), 100.0);
    scanner.start().await.unwrap();

    let report = scanner.run_cycle().await;

    assert_eq!(
        report.outcome(&TrackerId::from("T1")),
        Some(&TrackerOutcome::Published)
    );
    assert_eq!(gateway.count(Method::Get, "/tracker/T1/positions"), 1);
    assert_eq!(gateway.count(Method::Post, "/auth/token"), 1);

    let t1 = &sink.seen()[0];
    assert_eq!(t1.gps, (48.2, 16.37));
    assert_eq!(t1.attributes["pos_uncertainty"], json!(12));
}

#[tokio::test]
async fn trackers_are_processed_in_discovery_order() {
    let gateway = Arc::new(
        service()
            .on(Method::Get, "/device_hw_report/T1/", hardware(80))
            .on(Method::Get, "/tracker/T1/positions", positions(10)),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scanner = scanner(gateway, sink.clone(), 100.0);
    scanner.start().await.unwrap();

    scanner.run_cycle().await;
    scanner.run_cycle().await;

    assert_eq!(sink.ids(), vec!["T1", "T2", "T1", "T2"]);
}
