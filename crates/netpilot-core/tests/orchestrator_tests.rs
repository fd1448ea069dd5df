//! Driver load orchestration against scripted collaborators

use std::sync::Arc;
use std::time::Duration;

use netpilot_core::{FirmwareOutcome, LoadOptions, LoadOutcome, LoadState, ModuleConflict, Orchestrator, SkipReason};
use netpilot_drivers::{DeviceKind, HardwareDescriptor, RuleDatabase};
use netpilot_test_utils::devices::{
    asix_ax88179, atheros_qca6174, intel_ax210, intel_i219, intel_i350, realtek_rtl8168, realtek_rtl8822be,
    virtio_net,
};
use netpilot_test_utils::{FakeInstaller, FakeLoader};
use pretty_assertions::assert_eq;

const AX210_FIRMWARE: &str = "wifi-firmware-iwlwifi-kmod-ax210";
const RTW88_SPECIFIC: &str = "wifi-firmware-rtw88-kmod-rtw8822b";
const RTW88_GENERIC: &str = "wifi-firmware-rtw88-kmod";

struct Harness {
    loader: Arc<FakeLoader>,
    installer: Arc<FakeInstaller>,
    orchestrator: Orchestrator,
}

impl Harness {
    fn new(loader: FakeLoader, installer: FakeInstaller) -> Self {
        let loader = Arc::new(loader);
        let installer = Arc::new(installer);
        let orchestrator = Orchestrator::new(
            Arc::new(RuleDatabase::builtin().unwrap()),
            loader.clone(),
            installer.clone(),
        )
        .with_options(LoadOptions {
            settle_delay: Duration::ZERO,
            ..LoadOptions::default()
        });
        Self {
            loader,
            installer,
            orchestrator,
        }
    }

    fn plain() -> Self {
        Self::new(FakeLoader::new(), FakeInstaller::new())
    }

    async fn load(&self, descriptor: &HardwareDescriptor, state: &mut LoadState) -> LoadOutcome {
        self.orchestrator.resolve_and_load(descriptor, state).await
    }
}

fn loaded(module: &str, firmware: Option<FirmwareOutcome>) -> LoadOutcome {
    LoadOutcome::Loaded {
        module: module.to_string(),
        firmware,
    }
}

#[tokio::test]
async fn test_ethernet_driver_loads_without_firmware() {
    let h = Harness::plain();
    let mut state = LoadState::new();

    let outcome = h.load(&intel_i350(), &mut state).await;

    assert_eq!(outcome, loaded("if_igb", None));
    assert_eq!(h.loader.load_calls(), vec!["if_igb"]);
    assert!(h.installer.install_calls().is_empty());
    assert!(state.is_loaded("if_igb"));
}

#[tokio::test]
async fn test_prerequisites_load_before_driver_and_firmware_follows() {
    let h = Harness::plain();
    let mut state = LoadState::new();

    let outcome = h.load(&intel_ax210(), &mut state).await;

    assert_eq!(
        outcome,
        loaded(
            "if_iwlwifi",
            Some(FirmwareOutcome::Installed {
                package: AX210_FIRMWARE.to_string()
            })
        )
    );
    assert_eq!(h.loader.load_calls(), vec!["linuxkpi", "lindebugfs", "if_iwlwifi"]);
    assert_eq!(h.installer.install_calls(), vec![AX210_FIRMWARE]);
}

#[tokio::test]
async fn test_present_module_is_not_reloaded() {
    let h = Harness::new(FakeLoader::new().with_present(&["if_em"]), FakeInstaller::new());
    let mut state = LoadState::new();

    let outcome = h.load(&intel_i219(), &mut state).await;

    assert_eq!(outcome, loaded("if_em", None));
    assert!(h.loader.load_calls().is_empty());
    assert!(state.is_loaded("if_em"));
}

#[tokio::test]
async fn test_installed_firmware_is_not_reinstalled() {
    let h = Harness::new(FakeLoader::new(), FakeInstaller::new().with_installed(&[AX210_FIRMWARE]));
    let mut state = LoadState::new();

    let outcome = h.load(&intel_ax210(), &mut state).await;

    assert_eq!(
        outcome,
        loaded(
            "if_iwlwifi",
            Some(FirmwareOutcome::AlreadyInstalled {
                package: AX210_FIRMWARE.to_string()
            })
        )
    );
    assert!(h.installer.install_calls().is_empty());
}

#[tokio::test]
async fn test_firmware_falls_back_to_generic_exactly_once() {
    let h = Harness::new(FakeLoader::new(), FakeInstaller::new().failing(&[RTW88_SPECIFIC]));
    let mut state = LoadState::new();

    let outcome = h.load(&realtek_rtl8822be(), &mut state).await;

    assert_eq!(
        outcome,
        loaded(
            "if_rtw88",
            Some(FirmwareOutcome::FallbackInstalled {
                package: RTW88_GENERIC.to_string()
            })
        )
    );
    assert_eq!(h.installer.install_calls(), vec![RTW88_SPECIFIC, RTW88_GENERIC]);
}

#[tokio::test]
async fn test_both_firmware_tiers_failing_keeps_driver_loaded() {
    let h = Harness::new(
        FakeLoader::new(),
        FakeInstaller::new().failing(&[RTW88_SPECIFIC, RTW88_GENERIC]),
    );
    let mut state = LoadState::new();

    let outcome = h.load(&realtek_rtl8822be(), &mut state).await;

    match outcome {
        LoadOutcome::Loaded {
            module,
            firmware: Some(FirmwareOutcome::Failed { specific, generic, .. }),
        } => {
            assert_eq!(module, "if_rtw88");
            assert_eq!(specific, RTW88_SPECIFIC);
            assert_eq!(generic, RTW88_GENERIC);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(h.installer.install_calls().len(), 2);
    assert!(state.is_loaded("if_rtw88"));
}

#[tokio::test]
async fn test_no_fallback_when_tiers_coincide() {
    let h = Harness::new(FakeLoader::new(), FakeInstaller::new().failing(&[AX210_FIRMWARE]));
    let mut state = LoadState::new();

    let outcome = h.load(&intel_ax210(), &mut state).await;

    assert!(matches!(
        outcome,
        LoadOutcome::Loaded {
            firmware: Some(FirmwareOutcome::Failed { .. }),
            ..
        }
    ));
    assert_eq!(h.installer.install_calls(), vec![AX210_FIRMWARE]);
}

#[tokio::test]
async fn test_failed_module_is_skipped_for_later_devices() {
    let h = Harness::new(FakeLoader::new().failing(&["if_re"]), FakeInstaller::new());
    let mut state = LoadState::new();

    let first = h.load(&realtek_rtl8168(), &mut state).await;
    let second = h.load(&realtek_rtl8168(), &mut state).await;

    assert!(matches!(first, LoadOutcome::Failed { ref module, .. } if module == "if_re"));
    assert_eq!(
        second,
        LoadOutcome::Skipped {
            reason: SkipReason::PreviouslyFailed {
                module: "if_re".to_string()
            }
        }
    );
    assert_eq!(h.loader.load_calls(), vec!["if_re"]);
    assert!(state.has_failed("if_re"));
}

#[tokio::test]
async fn test_prerequisite_failure_does_not_stop_driver() {
    let h = Harness::new(FakeLoader::new().failing(&["lindebugfs"]), FakeInstaller::new());
    let mut state = LoadState::new();

    let outcome = h.load(&intel_ax210(), &mut state).await;

    assert_eq!(outcome.loaded_module(), Some("if_iwlwifi"));
    assert!(state.has_failed("lindebugfs"));
    assert!(state.is_loaded("linuxkpi"));
}

#[tokio::test]
async fn test_unsupported_hardware_is_skipped() {
    let h = Harness::plain();
    let mut state = LoadState::new();

    let outcome = h.load(&virtio_net(), &mut state).await;

    assert_eq!(
        outcome,
        LoadOutcome::Skipped {
            reason: SkipReason::NoRule
        }
    );
    assert!(h.loader.load_calls().is_empty());
}

#[tokio::test]
async fn test_batch_loads_wired_before_wireless() {
    let h = Harness::plain();
    let mut state = LoadState::new();
    let devices = vec![intel_ax210(), intel_i350(), realtek_rtl8822be(), asix_ax88179()];

    let report = h.orchestrator.resolve_batch(&devices, &mut state).await;

    let kinds: Vec<DeviceKind> = report.results.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![DeviceKind::Ethernet, DeviceKind::UsbEthernet, DeviceKind::Wifi, DeviceKind::Wifi]
    );
    assert_eq!(
        report.loaded_modules(),
        vec!["if_igb", "if_axge", "if_iwlwifi", "if_rtw88"]
    );
    let primary: Vec<String> = h
        .loader
        .load_calls()
        .into_iter()
        .filter(|m| m.starts_with("if_"))
        .collect();
    assert_eq!(primary, report.loaded_modules());
}

#[tokio::test]
async fn test_batch_report_partitions_outcomes() {
    let h = Harness::new(FakeLoader::new().failing(&["if_ath10k"]), FakeInstaller::new());
    let mut state = LoadState::new();
    let devices = vec![intel_i219(), atheros_qca6174(), virtio_net()];

    let report = h.orchestrator.resolve_batch(&devices, &mut state).await;

    assert_eq!(report.loaded().count(), 1);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.skipped().count(), 1);
    assert_eq!(report.firmware().count(), 0);
}

#[tokio::test]
async fn test_retry_failed_gives_module_another_attempt() {
    let h = Harness::new(FakeLoader::new().failing_times("if_re", 1), FakeInstaller::new());
    let mut state = LoadState::new();
    let devices = vec![realtek_rtl8168()];

    let first = h.orchestrator.resolve_batch(&devices, &mut state).await;
    assert_eq!(first.failed().count(), 1);

    let retried = h.orchestrator.retry_failed(&devices, &mut state, &["if_re"]).await;

    assert_eq!(retried.loaded_modules(), vec!["if_re"]);
    assert!(!state.has_failed("if_re"));
    assert_eq!(h.loader.load_calls(), vec!["if_re", "if_re"]);
}

#[tokio::test]
async fn test_conflicting_modules_are_reported() {
    let h = Harness::plain();
    let mut state = LoadState::new();
    let iwm = HardwareDescriptor::pci(0x8086, 0x095a, netpilot_drivers::ClassCode::PCI_WIRELESS);

    let report = h.orchestrator.resolve_batch(&[intel_ax210(), iwm], &mut state).await;

    assert_eq!(
        report.conflicts,
        vec![ModuleConflict {
            module: "if_iwm".to_string(),
            conflicts_with: "if_iwlwifi".to_string(),
        }]
    );
}
