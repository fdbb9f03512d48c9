//! End-to-end run over a captured office model.
//!
//! The fixture holds two links (structure and architecture), three host
//! levels and four plan views; the architectural model has seven rooms
//! covering every per-room outcome.

use pretty_assertions::assert_eq;
use roomtag_core::prelude::*;
use roomtag_core::IssueKind;
use roomtag_test_utils::load_snapshot;

const FIXTURE: &str = "office_two_levels.json";

fn arch_config() -> ReconcileConfig {
    ReconcileConfig::from_toml_str(
        r#"
        link_name_filter = "arch"
        worker_threads = 2
        "#,
    )
    .expect("valid config")
}

#[test]
fn office_snapshot_tags_every_eligible_room() {
    let (mut host, linked) = load_snapshot(FIXTURE).into_documents();

    let report = run_reconciliation(&mut host, &linked, &arch_config());

    assert!(report.is_succeeded(), "{report}");
    assert_eq!(report.link.as_ref().map(|l| l.display_name.as_str()), Some("Office_ARCH_Central"));
    assert_eq!(
        report.matching_levels.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Level 1", "Level 2"]
    );

    let tags: Vec<(i64, i64, Point2)> = host
        .tags()
        .iter()
        .map(|t| (t.view_id.value(), t.room_id.value(), t.point))
        .collect();
    assert_eq!(
        tags,
        vec![
            (1001, 201, Point2::new(110.0, 60.0)),
            (1001, 202, Point2::new(102.0, 72.0)),
            (1002, 201, Point2::new(110.0, 60.0)),
            (1002, 202, Point2::new(102.0, 72.0)),
            (1003, 203, Point2::new(105.0, 55.0)),
            (1004, 204, Point2::new(107.0, 57.0)),
        ]
    );
}

#[test]
fn office_snapshot_reports_every_skip() {
    let (mut host, linked) = load_snapshot(FIXTURE).into_documents();

    let report = run_reconciliation(&mut host, &linked, &arch_config());

    let issues: Vec<(i64, Option<i64>, String)> = report
        .issues
        .iter()
        .map(|i| (i.room_id.value(), i.view_id.map(ViewId::value), i.kind.to_string()))
        .collect();
    assert_eq!(
        issues,
        vec![
            (205, None, "level \"Basement\" not present in host".to_string()),
            (206, None, "no plan view matches the room's level and phase".to_string()),
            (207, Some(1001), "no usable geometry: room has no planar boundary".to_string()),
            (207, Some(1002), "no usable geometry: room has no planar boundary".to_string()),
        ]
    );
    assert_eq!(report.failures().count(), 0);
    assert!(report.issues.iter().all(|i| i.room_label.is_some()));

    let unplaced = report.room(RoomId::new(207)).expect("room 207");
    assert_eq!(unplaced.label.as_deref(), Some("103 Unplaced"));
    assert_eq!(unplaced.skipped, 2);
    assert!(unplaced.tagged_views.is_empty());
    assert!(matches!(report.issues[1].kind, IssueKind::NoCandidateView));
}

#[test]
fn office_snapshot_default_link_is_not_loaded() {
    let (mut host, linked) = load_snapshot(FIXTURE).into_documents();

    let report = run_reconciliation(&mut host, &linked, &ReconcileConfig::default());

    assert!(matches!(
        report.abort_reason(),
        Some(AbortReason::LinkedDocumentUnavailable { link, .. }) if link == "Office_STRUCT"
    ));
    assert!(host.is_untouched());
}

#[test]
fn office_snapshot_floor_plans_only() {
    let (mut host, linked) = load_snapshot(FIXTURE).into_documents();
    let config = arch_config().with_view_kinds([ViewKind::Floor]);

    let report = run_reconciliation(&mut host, &linked, &config);

    assert_eq!(report.views.len(), 3);
    assert!(host.tags_in(1002).is_empty());
    assert_eq!(report.tags_created(), 4);
}

#[test]
fn office_report_serializes_to_json() {
    let (mut host, linked) = load_snapshot(FIXTURE).into_documents();

    let report = run_reconciliation(&mut host, &linked, &arch_config());
    let json: serde_json::Value =
        serde_json::from_str(&report.to_json_pretty().expect("report serializes")).expect("valid json");

    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["link"]["document"], "office-arch.rvt");
    assert_eq!(json["placements"].as_array().map(Vec::len), Some(6));
    assert_eq!(json["issues"][0]["kind"], "no_matching_level");
    assert_eq!(json["issues"][0]["level"], "Basement");
    assert_eq!(json["issues"][0]["room_label"], "B01 Plant");
    assert_eq!(json["views"][1]["kind"], "ceiling");
    assert_eq!(json["views"][1]["placed"], 2);
    assert_eq!(json["run_id"], report.run_id.to_string());
}
