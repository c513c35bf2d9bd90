//! The on-disk snapshot format driven end to end: load a captured bundle
//! through the CLI loader, run the full audit against it, and check the
//! report survives a JSON round trip.

use std::io::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use polaris_core::ComplianceState;
use polaris_engine::{run_audit, AuditOptions, AuditReport};
use polaris_reconcile::Confidence;
use polaris_sources::{standard_sources, SnapshotTransport};
use polaris_targeting::STATUS_EXCLUDED;

use polaris_cli::input::load_snapshot;

const BUNDLE: &str = r#"{
    "device_id": "dev-1",
    "groups": [
        {"id": "g-fin", "display_name": "Finance"},
        {"id": "g-blk", "display_name": "Blocked devices"}
    ],
    "filters": [
        {"id": "f-1", "display_name": "Corporate laptops",
         "platform": "windows", "rule": "(device.model -eq \"Latitude\")"}
    ],
    "policies": [
        {
            "id": "pol-base",
            "display_name": "Security baseline",
            "platform": "windows",
            "kind": "compliance",
            "assignments": [
                {"target": {"kind": "include_group", "group_id": "g-fin"},
                 "filter_id": "f-1", "filter_mode": "include"}
            ]
        },
        {
            "id": "pol-blocked",
            "display_name": "Pilot profile",
            "platform": "windows",
            "kind": "configuration",
            "assignments": [
                {"target": {"kind": "all_devices"}},
                {"target": {"kind": "exclude_group", "group_id": "g-blk"}}
            ]
        },
        {
            "id": "pol-dangling",
            "display_name": "Stale assignment",
            "platform": "windows",
            "kind": "configuration",
            "assignments": [
                {"target": {"kind": "include_group", "group_id": "g-deleted"}}
            ]
        }
    ],
    "sources": {
        "policy_states": [
            {"policyId": "pol-base", "displayName": "Security baseline",
             "state": "compliant", "lastReportedDateTime": "2026-08-20T07:15:00Z"}
        ],
        "device_statuses": {
            "pol-base": [{"deviceId": "dev-1", "state": "compliant"}]
        }
    }
}"#;

async fn audit_bundle(bundle: &str) -> AuditReport {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bundle.as_bytes()).unwrap();
    let snapshot = load_snapshot(file.path()).unwrap();

    let catalog = snapshot.policy_catalog();
    let memberships = snapshot.memberships();
    let filters = snapshot.filter_catalog();
    let sources = standard_sources(Arc::new(SnapshotTransport::new(snapshot.sources.clone())));

    run_audit(
        snapshot.device_id.clone(),
        &catalog,
        &memberships,
        &filters,
        &sources,
        &AuditOptions::default(),
        CancellationToken::new(),
    )
    .await
}

#[tokio::test]
async fn captured_bundle_audits_end_to_end() {
    let report = audit_bundle(BUNDLE).await;
    assert_eq!(report.entries.len(), 3);

    let base = &report.entries[0];
    assert_eq!(base.targeting.status, "Finance");
    assert_eq!(
        base.targeting
            .applied_filter
            .as_ref()
            .map(|f| f.display_name.as_str()),
        Some("Corporate laptops")
    );
    let verdict = base.verdict.as_ref().unwrap();
    assert_eq!(verdict.state, ComplianceState::Compliant);
    assert_eq!(verdict.confidence, Confidence::High);

    let blocked = &report.entries[1];
    assert_eq!(blocked.targeting.status, STATUS_EXCLUDED);
    assert!(blocked.verdict.is_none());

    let dangling = &report.entries[2];
    assert!(!dangling.targeting.is_targeted());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].reference, "g-deleted");

    let summary = report.summary();
    assert_eq!(summary.targeted, 1);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.not_targeted, 1);
    assert_eq!(summary.problems, 0);
}

#[tokio::test]
async fn report_survives_a_json_round_trip() {
    let report = audit_bundle(BUNDLE).await;
    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: AuditReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.run_id, report.run_id);
    assert_eq!(back.device_id, report.device_id);
    assert_eq!(back.entries, report.entries);
    assert_eq!(back.warnings, report.warnings);
    assert_eq!(back.summary(), report.summary());
}
