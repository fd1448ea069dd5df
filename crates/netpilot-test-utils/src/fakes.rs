//! Scripted stand-ins for the system collaborators.
//!
//! Each fake records every mutating call so tests can assert on exactly
//! what would have run. Failures are scripted per name, either forever or
//! for a fixed number of attempts.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use netpilot_drivers::HardwareDescriptor;
use netpilot_system::{
    Discovery, Error, InterfaceRecord, ModuleLoader, PackageInstaller, Result, WirelessNetwork,
};

/// Remaining scripted failures per name.
#[derive(Debug, Default)]
struct Failures(Mutex<BTreeMap<String, usize>>);

impl Failures {
    fn set(&self, name: &str, times: usize) {
        self.0.lock().unwrap().insert(name.to_string(), times);
    }

    /// Consume one failure for `name`, returning whether the call fails.
    fn take(&self, name: &str) -> bool {
        let mut failures = self.0.lock().unwrap();
        match failures.get_mut(name) {
            Some(0) | None => false,
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                true
            }
        }
    }
}

fn command_failed(command: String, stderr: &str) -> Error {
    Error::CommandFailed {
        command,
        status: Some(1),
        stderr: stderr.to_string(),
    }
}

/// In-memory [`ModuleLoader`].
#[derive(Debug, Default)]
pub struct FakeLoader {
    present: Mutex<BTreeSet<String>>,
    failures: Failures,
    calls: Mutex<Vec<String>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modules that are loaded before the test starts.
    pub fn with_present(self, modules: &[&str]) -> Self {
        self.present
            .lock()
            .unwrap()
            .extend(modules.iter().map(|m| m.to_string()));
        self
    }

    /// Modules whose every load attempt fails.
    pub fn failing(self, modules: &[&str]) -> Self {
        for module in modules {
            self.failures.set(module, usize::MAX);
        }
        self
    }

    /// `module` fails its first `times` load attempts, then loads.
    pub fn failing_times(self, module: &str, times: usize) -> Self {
        self.failures.set(module, times);
        self
    }

    /// Every module passed to `load`, in call order.
    pub fn load_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_present(&self, module: &str) -> bool {
        self.present.lock().unwrap().contains(module)
    }
}

#[async_trait]
impl ModuleLoader for FakeLoader {
    async fn is_loaded(&self, module: &str) -> Result<bool> {
        Ok(self.is_present(module))
    }

    async fn load(&self, module: &str, _timeout: Duration) -> Result<()> {
        self.calls.lock().unwrap().push(module.to_string());
        if self.failures.take(module) {
            return Err(command_failed(
                format!("kldload {}", module),
                "kldload: can't load module: No such file or directory",
            ));
        }
        self.present.lock().unwrap().insert(module.to_string());
        Ok(())
    }
}

/// In-memory [`PackageInstaller`].
#[derive(Debug, Default)]
pub struct FakeInstaller {
    installed: Mutex<BTreeSet<String>>,
    failures: Failures,
    calls: Mutex<Vec<String>>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(self, packages: &[&str]) -> Self {
        self.installed
            .lock()
            .unwrap()
            .extend(packages.iter().map(|p| p.to_string()));
        self
    }

    /// Packages whose every install attempt fails.
    pub fn failing(self, packages: &[&str]) -> Self {
        for package in packages {
            self.failures.set(package, usize::MAX);
        }
        self
    }

    /// Every package passed to `install`, in call order.
    pub fn install_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_installed_now(&self, package: &str) -> bool {
        self.installed.lock().unwrap().contains(package)
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.is_installed_now(package))
    }

    async fn install(&self, package: &str, _timeout: Duration) -> Result<()> {
        self.calls.lock().unwrap().push(package.to_string());
        if self.failures.take(package) {
            return Err(command_failed(
                format!("pkg install -y {}", package),
                "pkg: No packages available to install matching the given name",
            ));
        }
        self.installed.lock().unwrap().insert(package.to_string());
        Ok(())
    }
}

/// [`Discovery`] serving fixed hardware and interfaces.
///
/// Interface actions are recorded as strings such as `create_wlan wlan0
/// iwlwifi0`, `dhcp em0`, `scan wlan0` and `devmatch`.
#[derive(Debug, Default)]
pub struct FakeDiscovery {
    pci: Vec<HardwareDescriptor>,
    usb: Vec<HardwareDescriptor>,
    interfaces: Vec<InterfaceRecord>,
    networks: BTreeMap<String, Vec<WirelessNetwork>>,
    failing_dhcp: BTreeSet<String>,
    pci_unavailable: bool,
    actions: Mutex<Vec<String>>,
}

impl FakeDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pci(mut self, devices: Vec<HardwareDescriptor>) -> Self {
        self.pci = devices;
        self
    }

    pub fn with_usb(mut self, devices: Vec<HardwareDescriptor>) -> Self {
        self.usb = devices;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<InterfaceRecord>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_networks(mut self, interface: &str, networks: Vec<WirelessNetwork>) -> Self {
        self.networks.insert(interface.to_string(), networks);
        self
    }

    pub fn failing_dhcp(mut self, interfaces: &[&str]) -> Self {
        self.failing_dhcp.extend(interfaces.iter().map(|i| i.to_string()));
        self
    }

    /// Make PCI enumeration fail as if `pciconf` were missing.
    pub fn without_pciconf(mut self) -> Self {
        self.pci_unavailable = true;
        self
    }

    /// Every recorded action, in call order.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl Discovery for FakeDiscovery {
    async fn pci_devices(&self) -> Result<Vec<HardwareDescriptor>> {
        if self.pci_unavailable {
            return Err(Error::CommandNotFound {
                command: "pciconf -lv".to_string(),
            });
        }
        Ok(self.pci.clone())
    }

    async fn usb_devices(&self) -> Result<Vec<HardwareDescriptor>> {
        Ok(self.usb.clone())
    }

    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>> {
        Ok(self.interfaces.clone())
    }

    async fn scan_wireless(&self, interface: &str) -> Result<Vec<WirelessNetwork>> {
        self.record(format!("scan {}", interface));
        Ok(self.networks.get(interface).cloned().unwrap_or_default())
    }

    async fn configure_dhcp(&self, interface: &str) -> Result<()> {
        self.record(format!("dhcp {}", interface));
        if self.failing_dhcp.contains(interface) {
            return Err(command_failed(format!("dhclient {}", interface), "dhclient: no link"));
        }
        Ok(())
    }

    async fn create_wlan(&self, parent: &str, wlan: &str) -> Result<()> {
        self.record(format!("create_wlan {} {}", wlan, parent));
        Ok(())
    }

    async fn run_devmatch(&self) {
        self.record("devmatch".to_string());
    }

    async fn os_release(&self) -> String {
        "14.1-RELEASE".to_string()
    }
}
