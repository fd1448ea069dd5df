//! Configuration file synchronization on real scratch files

use std::collections::HashMap;
use std::fs;

use chrono::{DateTime, Local, TimeZone};
use netpilot_core::sync::parse_assignments;
use netpilot_core::{ChangeAction, ConfigEntry, Error, FixedClock, SyncEngine};
use netpilot_test_utils::ConfigFixture;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
}

fn engine(fixture: &ConfigFixture) -> SyncEngine {
    SyncEngine::new(fixture.backup_dir()).with_clock(FixedClock(at()))
}

fn igb_entries(fixture: &ConfigFixture) -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new(fixture.loader_conf(), "if_igb_load", "YES"),
        ConfigEntry::new(fixture.loader_conf(), "if_igb_name", "/boot/modules/if_igb.ko"),
    ]
}

#[test]
fn test_missing_file_is_created_with_section() {
    let fixture = ConfigFixture::new();
    let mut engine = engine(&fixture);

    let result = engine.synchronize(&fixture.loader_conf(), &igb_entries(&fixture)).unwrap();

    assert_eq!(
        fixture.read_loader(),
        "\n# NetPilot Configuration - 2026-03-14 09:26:53\n\
         if_igb_load=\"YES\"\n\
         if_igb_name=\"/boot/modules/if_igb.ko\"\n"
    );
    assert!(result.written);
    assert_eq!(result.backup, None);
    assert_eq!(result.changes.len(), 2);
    assert!(result.changes.iter().all(|c| c.action == ChangeAction::Added && c.old_value.is_none()));
    assert_eq!(engine.journal(), result.changes.as_slice());
}

#[test]
fn test_changed_value_replaced_in_place() {
    let fixture = ConfigFixture::new();
    fixture.write_loader("# Boot settings\nautoboot_delay=\"3\"\n\nif_igb_load=\"NO\"\nkern.vty=vt\n");
    let mut engine = engine(&fixture);
    let entries = [ConfigEntry::new(fixture.loader_conf(), "if_igb_load", "YES")];

    let result = engine.synchronize(&fixture.loader_conf(), &entries).unwrap();

    assert_eq!(
        fixture.read_loader(),
        "# Boot settings\nautoboot_delay=\"3\"\n\nif_igb_load=\"YES\"\nkern.vty=vt\n"
    );
    assert_eq!(result.changes.len(), 1);
    let change = &result.changes[0];
    assert_eq!(change.action, ChangeAction::Modified);
    assert_eq!(change.old_value.as_deref(), Some("NO"));
    assert_eq!(change.new_value, "YES");
    assert_eq!(change.timestamp, at());
}

#[test]
fn test_backup_holds_previous_content() {
    let fixture = ConfigFixture::new();
    let original = "if_igb_load=\"NO\"\n";
    fixture.write_loader(original);
    let mut engine = engine(&fixture);

    let result = engine.synchronize(&fixture.loader_conf(), &igb_entries(&fixture)).unwrap();

    let backup = result.backup.expect("backup");
    assert_eq!(backup, fixture.backup_dir().join("loader.conf.20260314_092653.backup"));
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);
    assert!(result.changes.iter().all(|c| c.backup.as_ref() == Some(&backup)));
}

#[test]
fn test_same_second_runs_keep_every_backup() {
    let fixture = ConfigFixture::new();
    let original = "if_igb_load=\"NO\"\n";
    fixture.write_loader(original);
    let mut engine = engine(&fixture);

    let first = engine
        .synchronize(&fixture.loader_conf(), &[ConfigEntry::new(fixture.loader_conf(), "if_igb_load", "YES")])
        .unwrap();
    let after_first = fixture.read_loader();
    let second = engine
        .synchronize(&fixture.loader_conf(), &[ConfigEntry::new(fixture.loader_conf(), "if_igb_load", "NO")])
        .unwrap();

    let first_backup = first.backup.expect("first backup");
    let second_backup = second.backup.expect("second backup");
    assert_ne!(first_backup, second_backup);
    assert_eq!(fs::read_to_string(&first_backup).unwrap(), original);
    assert_eq!(fs::read_to_string(&second_backup).unwrap(), after_first);
    assert_eq!(engine.journal()[0].backup.as_ref(), Some(&first_backup));
    assert_eq!(fixture.backups().len(), 2);
}

#[test]
fn test_second_run_is_a_noop() {
    let fixture = ConfigFixture::new();
    fixture.write_loader("kern.vty=vt\n");
    let mut engine = engine(&fixture);
    let entries = igb_entries(&fixture);

    engine.synchronize(&fixture.loader_conf(), &entries).unwrap();
    let after_first = fixture.read_loader();
    let second = engine.synchronize(&fixture.loader_conf(), &entries).unwrap();

    assert!(!second.written);
    assert!(second.changes.is_empty());
    assert_eq!(second.backup, None);
    assert_eq!(fixture.read_loader(), after_first);
    assert_eq!(engine.journal().len(), 2);
    assert_eq!(fixture.backups().len(), 1);
}

#[test]
fn test_unrelated_lines_preserved_byte_for_byte() {
    let fixture = ConfigFixture::new();
    let original = "#!/bin/sh\n# hostname\nhostname=\"gate\"\n\n   # indented comment\nsshd_enable=YES\nnot an assignment\n";
    fixture.write_rc(original);
    let mut engine = engine(&fixture);
    let entries = [ConfigEntry::new(fixture.rc_conf(), "ifconfig_em0", "DHCP").with_comment("Configure em0 for DHCP")];

    engine.synchronize(&fixture.rc_conf(), &entries).unwrap();

    let content = fixture.read_rc();
    assert!(content.starts_with(original));
    assert_eq!(
        &content[original.len()..],
        "\n# NetPilot Configuration - 2026-03-14 09:26:53\n# Configure em0 for DHCP\nifconfig_em0=\"DHCP\"\n"
    );
}

#[test]
fn test_failed_write_leaves_file_and_journal_untouched() {
    let fixture = ConfigFixture::new();
    let original = "if_igb_load=\"NO\"\n";
    fixture.write_loader(original);
    // A directory squatting on the temp path makes the write fail
    fs::create_dir(netpilot_fs::io::temp_path_for(&fixture.loader_conf())).unwrap();
    let mut engine = engine(&fixture);

    let err = engine
        .synchronize(&fixture.loader_conf(), &igb_entries(&fixture))
        .unwrap_err();

    assert!(matches!(err, Error::ConfigWrite { ref path, .. } if *path == fixture.loader_conf()));
    assert_eq!(fixture.read_loader(), original);
    assert!(engine.journal().is_empty());
}

#[test]
fn test_backup_failure_does_not_block_write() {
    let fixture = ConfigFixture::new();
    fixture.write_loader("if_igb_load=\"NO\"\n");
    // The backup directory path is taken by a regular file
    fs::write(fixture.backup_dir(), "not a directory").unwrap();
    let mut engine = engine(&fixture);

    let result = engine.synchronize(&fixture.loader_conf(), &igb_entries(&fixture)).unwrap();

    assert!(result.written);
    assert_eq!(result.backup, None);
    assert!(fixture.read_loader().contains("if_igb_load=\"YES\""));
}

#[test]
fn test_plan_does_not_touch_disk() {
    let fixture = ConfigFixture::new();
    fixture.write_loader("if_igb_load=\"NO\"\n");
    let engine = engine(&fixture);

    let plan = engine.plan(&fixture.loader_conf(), &igb_entries(&fixture)).unwrap();

    assert_eq!(plan.changes.len(), 2);
    assert!(plan.diff().contains("+if_igb_load=\"YES\""));
    assert_eq!(fixture.read_loader(), "if_igb_load=\"NO\"\n");
    assert!(fixture.backups().is_empty());
    assert!(engine.journal().is_empty());
}

#[test]
fn test_summary_spans_files() {
    let fixture = ConfigFixture::new();
    let mut engine = engine(&fixture);

    engine.synchronize(&fixture.rc_conf(), &[ConfigEntry::new(fixture.rc_conf(), "ifconfig_em0", "up")]).unwrap();
    engine.synchronize(&fixture.loader_conf(), &igb_entries(&fixture)).unwrap();

    let summary = engine.summary();
    assert_eq!(summary.total_changes, 3);
    assert_eq!(summary.backup_directory, fixture.backup_dir());
    let mut expected = vec![fixture.loader_conf(), fixture.rc_conf()];
    expected.sort();
    assert_eq!(summary.files_modified, expected);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["changes"][0]["action"], "added");
    let stamp = json["changes"][0]["timestamp"].as_str().unwrap();
    assert_eq!(DateTime::parse_from_rfc3339(stamp).unwrap(), at().fixed_offset());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_synchronize_is_idempotent(
        existing in prop::collection::vec(("[a-z][a-z0-9_]{0,6}", "[A-Za-z0-9/._-]{0,10}"), 0..6),
        desired in prop::collection::vec(("[a-z][a-z0-9_]{0,6}", "[A-Za-z0-9/._-]{0,10}"), 1..8),
    ) {
        let fixture = ConfigFixture::new();
        let content: String = existing
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"\n", k, v))
            .collect();
        fixture.write_loader(&content);
        let entries: Vec<ConfigEntry> = desired
            .iter()
            .map(|(k, v)| ConfigEntry::new(fixture.loader_conf(), k.as_str(), v.as_str()))
            .collect();
        let mut engine = engine(&fixture);

        engine.synchronize(&fixture.loader_conf(), &entries).unwrap();
        let after_first = fixture.read_loader();
        let second = engine.synchronize(&fixture.loader_conf(), &entries).unwrap();

        prop_assert!(!second.written);
        prop_assert_eq!(fixture.read_loader(), after_first.clone());

        let mut wanted: HashMap<&str, &str> = HashMap::new();
        for (k, v) in &desired {
            wanted.insert(k.as_str(), v.as_str());
        }
        let parsed = parse_assignments(&after_first);
        for (key, value) in wanted {
            prop_assert_eq!(parsed.get(key).map(String::as_str), Some(value));
        }
    }
}
