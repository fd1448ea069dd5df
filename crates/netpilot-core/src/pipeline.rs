//! End-to-end run: discover, load, probe, configure
//!
//! A run has three phases that callers can drive separately:
//!
//! 1. [`Pipeline::discover`] enumerates hardware, loads drivers, waits for
//!    interfaces to appear, enumerates them and performs the requested
//!    interface actions (wlan creation, scans, runtime DHCP)
//! 2. [`Pipeline::preview`] computes the configuration file changes the
//!    run would make, without touching disk
//! 3. [`Pipeline::apply`] writes those changes
//!
//! [`Pipeline::run`] performs all three in order.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use netpilot_drivers::{HardwareDescriptor, RuleDatabase};
use netpilot_system::{
    Discovery, InterfaceKind, InterfaceRecord, ModuleLoader, PackageInstaller, WirelessNetwork,
};

use crate::entries::{loader_entries, rc_entries};
use crate::orchestrator::{BatchReport, Orchestrator};
use crate::settings::Settings;
use crate::state::LoadState;
use crate::sync::{ChangeRecord, ChangeSummary, ConfigEntry, PlannedChange, SyncEngine};

/// What a run should do beyond discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Resolve and load drivers for discovered hardware
    pub load_drivers: bool,
    /// Give modules that failed a second attempt in the same run
    pub retry_failed: bool,
    /// Persist loaded drivers to `loader.conf`
    pub configure_boot: bool,
    /// Persist interface startup to `rc.conf`
    pub configure_startup: bool,
    /// Use DHCP: in `rc.conf` with `configure_startup`, otherwise at runtime
    pub dhcp: bool,
    pub create_wlan: bool,
    pub scan_wifi: bool,
    /// Restrict runtime DHCP to one interface
    pub interface: Option<String>,
    /// Compute configuration changes for preview
    pub preview_config: bool,
}

impl RunOptions {
    /// Options for a plain run that loads drivers and changes nothing else.
    pub fn loading() -> Self {
        Self {
            load_drivers: true,
            ..Self::default()
        }
    }

    /// Whether the run writes any configuration file.
    pub fn writes_config(&self) -> bool {
        self.configure_boot || self.configure_startup
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryInfo {
    pub timestamp: DateTime<Local>,
    pub duration_secs: f64,
    pub os_release: String,
    pub version: String,
    pub total_devices: usize,
    pub total_interfaces: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub pci_devices: usize,
    pub usb_devices: usize,
    pub ethernet_interfaces: usize,
    pub wifi_interfaces: usize,
    pub active_interfaces: usize,
    pub modules_loaded: usize,
    pub modules_failed: usize,
}

/// Runtime DHCP attempt on one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpResult {
    pub interface: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Pending changes for one configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigPreview {
    pub path: PathBuf,
    pub entries: Vec<ConfigEntry>,
    pub changes: Vec<PlannedChange>,
    /// Unified diff, empty when nothing changes
    pub diff: String,
    pub error: Option<String>,
}

/// Synchronization outcome for one configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSyncReport {
    pub path: PathBuf,
    pub success: bool,
    /// Desired entries handed to the engine
    pub entries: usize,
    pub changes: Vec<ChangeRecord>,
    pub backup: Option<PathBuf>,
    pub error: Option<String>,
}

/// Everything a run found and did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub discovery_info: DiscoveryInfo,
    pub devices: Vec<HardwareDescriptor>,
    pub interfaces: Vec<InterfaceRecord>,
    /// `None` when driver loading was disabled
    pub driver_results: Option<BatchReport>,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wlan_interfaces_created: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub available_networks: BTreeMap<String, Vec<WirelessNetwork>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dhcp_configuration: Vec<DhcpResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_preview: Vec<ConfigPreview>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system_configuration: Vec<FileSyncReport>,
    pub change_summary: Option<ChangeSummary>,
}

impl RunReport {
    /// Whether any configuration file failed to synchronize.
    pub fn has_sync_failures(&self) -> bool {
        self.system_configuration.iter().any(|r| !r.success)
    }
}

/// Drives one NetPilot run against a set of collaborators.
pub struct Pipeline {
    discovery: Arc<dyn Discovery>,
    orchestrator: Orchestrator,
    engine: SyncEngine,
    loader_conf: PathBuf,
    rc_conf: PathBuf,
    probe_delay: Duration,
    state: LoadState,
}

impl Pipeline {
    pub fn new(discovery: Arc<dyn Discovery>, orchestrator: Orchestrator, engine: SyncEngine) -> Self {
        let defaults = Settings::default();
        let probe_delay = defaults.probe_delay();
        Self {
            discovery,
            orchestrator,
            engine,
            loader_conf: defaults.loader_conf,
            rc_conf: defaults.rc_conf,
            probe_delay,
            state: LoadState::new(),
        }
    }

    /// Assemble a pipeline with paths, timeouts and delays from `settings`.
    pub fn from_settings(
        settings: &Settings,
        db: Arc<RuleDatabase>,
        discovery: Arc<dyn Discovery>,
        loader: Arc<dyn ModuleLoader>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        let orchestrator = Orchestrator::new(db, loader, installer).with_options(settings.load_options());
        Self::new(discovery, orchestrator, SyncEngine::new(&settings.backup_dir))
            .with_paths(&settings.loader_conf, &settings.rc_conf)
            .with_probe_delay(settings.probe_delay())
    }

    pub fn with_paths(mut self, loader_conf: impl Into<PathBuf>, rc_conf: impl Into<PathBuf>) -> Self {
        self.loader_conf = loader_conf.into();
        self.rc_conf = rc_conf.into();
        self
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Run every phase the options ask for.
    pub async fn run(&mut self, options: &RunOptions) -> RunReport {
        let mut report = self.discover(options).await;
        if options.preview_config {
            report.config_preview = self.preview(&report, options);
        }
        if options.writes_config() {
            self.apply(&mut report, options);
        }
        report
    }

    /// Enumerate hardware, load drivers and enumerate interfaces.
    ///
    /// Enumeration failures are logged and treated as finding nothing.
    pub async fn discover(&mut self, options: &RunOptions) -> RunReport {
        tracing::info!("Starting network discovery");
        let started = Instant::now();
        let timestamp = Local::now();

        if options.load_drivers {
            self.discovery.run_devmatch().await;
        }

        let (pci, usb) = tokio::join!(self.discovery.pci_devices(), self.discovery.usb_devices());
        let pci = pci.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "PCI enumeration failed");
            Vec::new()
        });
        let usb = usb.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "USB enumeration failed");
            Vec::new()
        });
        let statistics = Statistics {
            pci_devices: pci.len(),
            usb_devices: usb.len(),
            ..Statistics::default()
        };
        let devices: Vec<HardwareDescriptor> = pci.into_iter().chain(usb).collect();
        tracing::info!(count = devices.len(), "Found network devices");

        let driver_results = if options.load_drivers {
            Some(self.load_drivers(&devices, options.retry_failed).await)
        } else {
            None
        };

        let interfaces = self.discovery.interfaces().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Interface enumeration failed");
            Vec::new()
        });

        let mut report = RunReport {
            discovery_info: DiscoveryInfo {
                timestamp,
                duration_secs: 0.0,
                os_release: self.discovery.os_release().await,
                version: env!("CARGO_PKG_VERSION").to_string(),
                total_devices: devices.len(),
                total_interfaces: interfaces.len(),
            },
            devices,
            statistics: Statistics {
                ethernet_interfaces: interfaces.iter().filter(|i| i.kind == InterfaceKind::Ethernet).count(),
                wifi_interfaces: interfaces.iter().filter(|i| i.is_wifi()).count(),
                active_interfaces: interfaces.iter().filter(|i| i.is_active()).count(),
                modules_loaded: self.state.loaded().len(),
                modules_failed: self.state.failed().len(),
                ..statistics
            },
            interfaces,
            driver_results,
            wlan_interfaces_created: Vec::new(),
            available_networks: BTreeMap::new(),
            dhcp_configuration: Vec::new(),
            config_preview: Vec::new(),
            system_configuration: Vec::new(),
            change_summary: None,
        };

        if options.create_wlan && options.load_drivers {
            report.wlan_interfaces_created = self.create_wlans(&report.interfaces).await;
        }
        if options.scan_wifi {
            report.available_networks = self.scan(&report.interfaces).await;
        }
        if options.dhcp && !options.configure_startup {
            report.dhcp_configuration = self.configure_dhcp(&report.interfaces, options.interface.as_deref()).await;
        }

        report.discovery_info.duration_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            duration_secs = report.discovery_info.duration_secs,
            devices = report.discovery_info.total_devices,
            interfaces = report.discovery_info.total_interfaces,
            "Discovery completed"
        );
        report
    }

    /// Desired entries per configuration file for `report`.
    ///
    /// Files with no entries are left out.
    pub fn config_targets(&self, report: &RunReport, boot: bool, startup: bool, dhcp: bool) -> Vec<(PathBuf, Vec<ConfigEntry>)> {
        let mut targets = Vec::new();
        if boot {
            let modules = report
                .driver_results
                .as_ref()
                .map(BatchReport::loaded_modules)
                .unwrap_or_default();
            let entries = loader_entries(&self.loader_conf, &modules);
            if !entries.is_empty() {
                targets.push((self.loader_conf.clone(), entries));
            }
        }
        if startup {
            let entries = rc_entries(&self.rc_conf, &report.interfaces, dhcp);
            if !entries.is_empty() {
                targets.push((self.rc_conf.clone(), entries));
            }
        }
        targets
    }

    /// Changes the run would make to `loader.conf` and `rc.conf`.
    ///
    /// Both files are previewed unless the options name specific ones.
    pub fn preview(&self, report: &RunReport, options: &RunOptions) -> Vec<ConfigPreview> {
        let (boot, startup) = if options.writes_config() {
            (options.configure_boot, options.configure_startup)
        } else {
            (true, true)
        };

        self.config_targets(report, boot, startup, options.dhcp)
            .into_iter()
            .map(|(path, entries)| match self.engine.plan(&path, &entries) {
                Ok(plan) => ConfigPreview {
                    diff: plan.diff(),
                    changes: plan.changes,
                    path,
                    entries,
                    error: None,
                },
                Err(e) => ConfigPreview {
                    path,
                    entries,
                    changes: Vec::new(),
                    diff: String::new(),
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }

    /// Write the configuration changes requested by `options`.
    ///
    /// A failure on one file is recorded in the report and does not stop
    /// the other file from being written.
    pub fn apply(&mut self, report: &mut RunReport, options: &RunOptions) {
        let targets = self.config_targets(report, options.configure_boot, options.configure_startup, options.dhcp);
        for (path, entries) in targets {
            let file_report = match self.engine.synchronize(&path, &entries) {
                Ok(result) => FileSyncReport {
                    path,
                    success: true,
                    entries: entries.len(),
                    changes: result.changes,
                    backup: result.backup,
                    error: None,
                },
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to update configuration file");
                    FileSyncReport {
                        path,
                        success: false,
                        entries: entries.len(),
                        changes: Vec::new(),
                        backup: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.system_configuration.push(file_report);
        }

        if !self.engine.journal().is_empty() {
            report.change_summary = Some(self.engine.summary());
        }
    }

    async fn load_drivers(&mut self, devices: &[HardwareDescriptor], retry_failed: bool) -> BatchReport {
        let mut batch = self.orchestrator.resolve_batch(devices, &mut self.state).await;

        if retry_failed && !self.state.failed().is_empty() {
            let failed: Vec<String> = self.state.failed().iter().cloned().collect();
            batch = self.orchestrator.retry_failed(devices, &mut self.state, &failed).await;
        }

        if !self.probe_delay.is_zero() {
            tracing::debug!(delay = ?self.probe_delay, "Waiting for interfaces to attach");
            tokio::time::sleep(self.probe_delay).await;
        }
        batch
    }

    async fn create_wlans(&self, interfaces: &[InterfaceRecord]) -> Vec<String> {
        let mut created = Vec::new();
        for parent in interfaces.iter().filter(|i| i.is_wifi()) {
            let wlan = format!("wlan{}", created.len());
            match self.discovery.create_wlan(&parent.name, &wlan).await {
                Ok(()) => created.push(wlan),
                Err(e) => tracing::warn!(parent = %parent.name, wlan = %wlan, error = %e, "Failed to create wlan interface"),
            }
        }
        created
    }

    async fn scan(&self, interfaces: &[InterfaceRecord]) -> BTreeMap<String, Vec<WirelessNetwork>> {
        let mut networks = BTreeMap::new();
        for interface in interfaces.iter().filter(|i| i.is_wifi()) {
            match self.discovery.scan_wireless(&interface.name).await {
                Ok(found) => {
                    tracing::info!(interface = %interface.name, networks = found.len(), "Wireless scan complete");
                    networks.insert(interface.name.clone(), found);
                }
                Err(e) => tracing::warn!(interface = %interface.name, error = %e, "Wireless scan failed"),
            }
        }
        networks
    }

    async fn configure_dhcp(&self, interfaces: &[InterfaceRecord], only: Option<&str>) -> Vec<DhcpResult> {
        let mut results = Vec::new();
        let targets = interfaces
            .iter()
            .filter(|i| i.kind == InterfaceKind::Ethernet)
            .filter(|i| only.is_none_or(|name| i.name == name));
        for interface in targets {
            let result = self.discovery.configure_dhcp(&interface.name).await;
            if let Err(e) = &result {
                tracing::warn!(interface = %interface.name, error = %e, "DHCP configuration failed");
            }
            results.push(DhcpResult {
                interface: interface.name.clone(),
                success: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }
        results
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("orchestrator", &self.orchestrator)
            .field("engine", &self.engine)
            .field("loader_conf", &self.loader_conf)
            .field("rc_conf", &self.rc_conf)
            .field("state", &self.state)
            .finish()
    }
}
