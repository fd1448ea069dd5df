//! Black-box tests for the netpilot binary

use assert_cmd::Command;
use assert_fs::prelude::*;
use netpilot_test_utils::ConfigFixture;
use predicates::prelude::*;

fn netpilot() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netpilot"));
    cmd.env_remove("NETPILOT_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    netpilot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--configure-boot"))
        .stdout(predicate::str::contains("--show-coverage"))
        .stdout(predicate::str::contains("--no-driver-loading"));
}

#[test]
fn test_version() {
    netpilot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_show_coverage_human() {
    netpilot()
        .arg("--show-coverage")
        .assert()
        .success()
        .stdout(predicate::str::contains("NetPilot Hardware Coverage"))
        .stdout(predicate::str::contains("if_igb"))
        .stdout(predicate::str::contains("Firmware packages"));
}

#[test]
fn test_show_coverage_json() {
    let output = netpilot().args(["--show-coverage", "--json"]).output().unwrap();
    assert!(output.status.success());

    let coverage: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for key in ["ethernet_pci", "wifi_pci", "ethernet_usb", "wifi_usb", "firmware_packages"] {
        assert!(coverage[key].is_array(), "missing {key}");
    }
    assert!(!coverage["ethernet_pci"].as_array().unwrap().is_empty());
}

#[test]
fn test_verbose_and_quiet_conflict() {
    netpilot().args(["-v", "-q", "--show-coverage"]).assert().failure();
}

#[test]
fn test_missing_settings_file_is_fatal() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.child("absent.toml");

    netpilot()
        .args(["--no-driver-loading", "--config"])
        .arg(missing.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("Settings not found"));
}

#[test]
fn test_invalid_settings_file_is_fatal() {
    let temp = assert_fs::TempDir::new().unwrap();
    let settings = temp.child("netpilot.toml");
    settings.write_str("max_workers = \"many\"\n").unwrap();

    netpilot()
        .args(["--no-driver-loading", "--config"])
        .arg(settings.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid settings"));
}

#[test]
fn test_settings_path_from_environment() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.child("from-env.toml");

    netpilot()
        .arg("--no-driver-loading")
        .env("NETPILOT_CONFIG", missing.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("from-env.toml"));
}

#[test]
fn test_discovery_only_json_report() {
    let fixture = ConfigFixture::new();
    let settings = fixture.write_settings();

    let output = netpilot()
        .args(["--no-driver-loading", "--json", "-q", "--config"])
        .arg(&settings)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["discovery_info"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(report["devices"].is_array());
    assert!(report["interfaces"].is_array());
    assert!(report["driver_results"].is_null());
    assert!(report.get("system_configuration").is_none());

    assert!(fixture.backups().is_empty());
}

#[test]
fn test_show_config_changes_never_writes() {
    let fixture = ConfigFixture::new();
    fixture.write_loader("autoboot_delay=\"3\"\n");
    let settings = fixture.write_settings();

    netpilot()
        .args(["--no-driver-loading", "--show-config-changes", "--configure-boot", "-q", "--config"])
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration changes (not applied)"));

    assert_eq!(fixture.read_loader(), "autoboot_delay=\"3\"\n");
    assert!(fixture.backups().is_empty());
}
