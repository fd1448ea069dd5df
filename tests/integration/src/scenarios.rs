//! End-to-end scenarios across the driver database, orchestrator and sync engine
//!
//! Each test drives a full pipeline with the built-in rule table, fake
//! system collaborators and real configuration files in a scratch dir.

use std::sync::Arc;

use netpilot_core::sync::SECTION_HEADER;
use netpilot_core::{ChangeAction, FirmwareOutcome, LoadOutcome, Pipeline, RunOptions, RunReport, Settings};
use netpilot_drivers::{ClassCode, HardwareDescriptor, RuleDatabase, resolve_firmware};
use netpilot_test_utils::devices::{ethernet_interface, intel_ax210, intel_i350, realtek_rtl8168, wifi_interface};
use netpilot_test_utils::{ConfigFixture, FakeDiscovery, FakeInstaller, FakeLoader};
use pretty_assertions::assert_eq;

struct Machine {
    fixture: ConfigFixture,
    loader: Arc<FakeLoader>,
    installer: Arc<FakeInstaller>,
    discovery: Arc<FakeDiscovery>,
}

impl Machine {
    fn new(discovery: FakeDiscovery) -> Self {
        Self {
            fixture: ConfigFixture::new(),
            loader: Arc::new(FakeLoader::new()),
            installer: Arc::new(FakeInstaller::new()),
            discovery: Arc::new(discovery),
        }
    }

    /// A fresh pipeline, as a new process invocation would build it.
    fn pipeline(&self) -> Pipeline {
        let settings = Settings::load(&self.fixture.write_settings()).unwrap();
        Pipeline::from_settings(
            &settings,
            Arc::new(RuleDatabase::builtin().unwrap()),
            self.discovery.clone(),
            self.loader.clone(),
            self.installer.clone(),
        )
    }

    async fn run(&self, options: &RunOptions) -> RunReport {
        self.pipeline().run(options).await
    }
}

fn boot() -> RunOptions {
    RunOptions {
        configure_boot: true,
        ..RunOptions::loading()
    }
}

#[tokio::test]
async fn scenario_a_empty_loader_conf_gets_section() {
    let machine = Machine::new(FakeDiscovery::new().with_pci(vec![intel_i350()]));
    machine.fixture.write_loader("");

    let report = machine.run(&boot()).await;

    let content = machine.fixture.read_loader();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "");
    assert!(lines[1].starts_with(&format!("{} - ", SECTION_HEADER)));
    assert_eq!(
        lines[2..],
        [
            "# Load if_igb network driver at boot",
            "if_igb_load=\"YES\"",
            "# Specify path for if_igb kernel module",
            "if_igb_name=\"/boot/modules/if_igb.ko\"",
        ]
    );

    let file = &report.system_configuration[0];
    assert!(file.success);
    let changes: Vec<(&str, ChangeAction)> = file.changes.iter().map(|c| (c.key.as_str(), c.action)).collect();
    assert_eq!(
        changes,
        vec![("if_igb_load", ChangeAction::Added), ("if_igb_name", ChangeAction::Added)]
    );
}

#[tokio::test]
async fn scenario_b_existing_value_replaced_in_place() {
    let machine = Machine::new(FakeDiscovery::new().with_pci(vec![intel_i350()]));
    machine
        .fixture
        .write_loader("autoboot_delay=\"3\"\nif_igb_load=\"NO\"\nif_igb_name=\"/boot/modules/if_igb.ko\"\n");

    let report = machine.run(&boot()).await;

    assert_eq!(
        machine.fixture.read_loader(),
        "autoboot_delay=\"3\"\nif_igb_load=\"YES\"\nif_igb_name=\"/boot/modules/if_igb.ko\"\n"
    );

    let changes = &report.system_configuration[0].changes;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].action, ChangeAction::Modified);
    assert_eq!(changes[0].old_value.as_deref(), Some("NO"));
    assert_eq!(changes[0].new_value, "YES");
    assert_eq!(machine.fixture.backups().len(), 1);
}

#[tokio::test]
async fn scenario_c_ax210_gets_specific_firmware() {
    let db = RuleDatabase::builtin().unwrap();
    let ax210 = intel_ax210();
    let rule = db.match_device(&ax210).unwrap();
    assert_eq!(rule.module, "if_iwlwifi");
    assert_eq!(
        resolve_firmware(&ax210, rule).as_deref(),
        Some("wifi-firmware-iwlwifi-kmod-ax210")
    );

    let machine = Machine::new(FakeDiscovery::new().with_pci(vec![ax210]));
    let report = machine.run(&RunOptions::loading()).await;

    assert_eq!(machine.installer.install_calls(), vec!["wifi-firmware-iwlwifi-kmod-ax210"]);
    let batch = report.driver_results.unwrap();
    let firmware: Vec<_> = batch.firmware().collect();
    assert_eq!(
        firmware,
        vec![(
            "if_iwlwifi",
            &FirmwareOutcome::Installed {
                package: "wifi-firmware-iwlwifi-kmod-ax210".to_string()
            }
        )]
    );
}

#[tokio::test]
async fn scenario_d_usb_device_never_matches_pci_rules() {
    let db = RuleDatabase::builtin().unwrap();
    let pci_rule = db.match_device(&realtek_rtl8168()).unwrap();
    assert_eq!(pci_rule.module, "if_re");

    let bare = HardwareDescriptor::usb(0x10ec, 0x8168, None);
    assert!(db.match_device(&bare).is_none());

    let cdc = HardwareDescriptor::usb(0x10ec, 0x8168, Some(ClassCode::USB_COMMUNICATIONS));
    assert_eq!(db.match_device(&cdc).unwrap().module, "if_cdce");

    let machine = Machine::new(FakeDiscovery::new().with_usb(vec![bare]));
    let report = machine.run(&RunOptions::loading()).await;
    assert!(machine.loader.load_calls().is_empty());
    assert!(matches!(
        report.driver_results.unwrap().results[0].outcome,
        LoadOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn repeated_runs_converge() {
    let machine = Machine::new(
        FakeDiscovery::new()
            .with_pci(vec![intel_ax210(), intel_i350()])
            .with_interfaces(vec![ethernet_interface("igb0"), wifi_interface("iwlwifi0")]),
    );
    machine.fixture.write_loader("kern.vty=\"vt\"\n");
    machine.fixture.write_rc("hostname=\"bsdbox\"\n");
    let options = RunOptions {
        configure_boot: true,
        configure_startup: true,
        dhcp: true,
        ..RunOptions::loading()
    };

    let first = machine.run(&options).await;
    let loader_after_first = machine.fixture.read_loader();
    let rc_after_first = machine.fixture.read_rc();
    assert!(first.system_configuration.iter().all(|f| f.success && !f.changes.is_empty()));
    assert!(loader_after_first.starts_with("kern.vty=\"vt\"\n"));
    assert!(rc_after_first.contains("ifconfig_igb0=\"DHCP\""));
    assert!(rc_after_first.contains("wlans_iwlwifi0=\"wlan0\""));
    assert!(rc_after_first.contains("ifconfig_wlan0=\"WPA DHCP\""));

    let second = machine.run(&options).await;
    assert!(second.system_configuration.iter().all(|f| f.success && f.changes.is_empty()));
    assert!(second.change_summary.is_none());
    assert_eq!(machine.fixture.read_loader(), loader_after_first);
    assert_eq!(machine.fixture.read_rc(), rc_after_first);
    assert_eq!(machine.fixture.backups().len(), 2);
}

#[tokio::test]
async fn report_round_trips_through_json() {
    let machine = Machine::new(
        FakeDiscovery::new()
            .with_pci(vec![intel_i350()])
            .with_interfaces(vec![ethernet_interface("igb0")]),
    );
    let report = machine.run(&boot()).await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["statistics"]["pci_devices"], 1);
    assert_eq!(json["driver_results"]["results"][0]["outcome"]["module"], "if_igb");
    assert_eq!(json["system_configuration"][0]["changes"][0]["action"], "added");
    assert_eq!(json["change_summary"]["total_changes"], 2);
}
