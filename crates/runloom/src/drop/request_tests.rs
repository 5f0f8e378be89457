// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;

#[test]
fn test_builder_and_total() {
    let request = DropRequest::new("trade-1", "pw")
        .with_quota("jah", 2)
        .with_quota("ber", 1);

    assert_eq!(request.total_quota(), 3);
    assert!(request.validate().is_ok());
}

#[test]
fn test_total_of_maximal_quotas() {
    let request = DropRequest::new("room", "")
        .with_quota("a", u32::MAX)
        .with_quota("b", 1);

    assert!(request.validate().is_ok());
    assert_eq!(request.total_quota(), u64::from(u32::MAX) + 1);
}

#[rstest]
#[case::empty_room(DropRequest::new(" ", "").with_quota("jah", 1), "room")]
#[case::no_quotas(DropRequest::new("trade", ""), "no item quotas")]
#[case::zero_quota(DropRequest::new("trade", "").with_quota("jah", 0), "'jah'")]
fn test_validate_rejects(#[case] request: DropRequest, #[case] expected: &str) {
    let err = request.validate().unwrap_err();
    assert!(err.to_string().contains(expected), "{}", err);
}

#[test]
fn test_load_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let toml_path = dir.path().join("drop.toml");
    std::fs::write(
        &toml_path,
        "room = \"trade\"\npassword = \"x\"\n[quotas]\njah = 3\n",
    )
    .unwrap();
    let json_path = dir.path().join("drop.json");
    std::fs::write(&json_path, r#"{"room": "trade", "quotas": {"ber": 1}}"#).unwrap();

    let from_toml = DropRequest::load(&toml_path).unwrap();
    let from_json = DropRequest::load(&json_path).unwrap();

    assert_eq!(from_toml, DropRequest::new("trade", "x").with_quota("jah", 3));
    assert_eq!(from_json.password, "");
    assert_eq!(from_json.quotas.get("ber"), Some(&1));
}

#[test]
fn test_load_rejects_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drop.toml");
    std::fs::write(&path, "room = \"trade\"\n[quotas]\n").unwrap();

    assert!(matches!(
        DropRequest::load(&path),
        Err(DropError::InvalidRequest(_))
    ));
    assert!(DropRequest::load(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_pending_drop_reply_reaches_receiver() {
    let (pending, receiver) = PendingDrop::new(DropRequest::new("trade", "").with_quota("jah", 1));
    let report = DropReport {
        status: DropStatus::Completed,
        items_dropped: [("jah".to_string(), 1)].into_iter().collect(),
        duration: Duration::from_secs(4),
        error: None,
        finished_at: Utc::now(),
    };

    pending.reply.send(report.clone()).unwrap();

    let received = receiver.blocking_recv().unwrap();
    assert_eq!(received, report);
    assert_eq!(received.total_dropped(), 1);
}
