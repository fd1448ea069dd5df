//! Driver rule records
//!
//! A rule is pure data: which hardware it applies to, which kernel module
//! drives it, what must be loaded first and which firmware package it
//! needs. The constructor helpers exist only to keep the built-in table
//! readable.

use serde::Serialize;

use crate::descriptor::{BusKind, ClassCode, DeviceKind, HardwareDescriptor};

/// Default load priority for rules that do not set one.
pub const DEFAULT_PRIORITY: u32 = 50;

/// Maps matching hardware to a kernel module.
///
/// Unset predicates (`None` or an empty list) match every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverRule {
    /// Kernel module name, e.g. `if_iwlwifi`
    pub module: String,
    /// Exact vendor id
    pub vendor: Option<u16>,
    /// Any-of vendor ids
    pub vendor_ids: Vec<u16>,
    /// Any-of device ids
    pub device_ids: Vec<u16>,
    pub class: Option<ClassCode>,
    pub bus: BusKind,
    /// Generic firmware package
    pub firmware: Option<String>,
    /// Modules to load first, in order
    pub dependencies: Vec<String>,
    /// Modules known to conflict with this one
    pub conflicts: Vec<String>,
    /// Lower loads first and wins ties between matching rules
    pub priority: u32,
    pub description: String,
    pub kind: DeviceKind,
}

impl DriverRule {
    /// Start a rule for a PCI device.
    pub fn pci(module: impl Into<String>, kind: DeviceKind) -> Self {
        Self::new(module, BusKind::Pci, kind)
    }

    /// Start a rule for a USB device.
    pub fn usb(module: impl Into<String>, kind: DeviceKind) -> Self {
        Self::new(module, BusKind::Usb, kind)
    }

    fn new(module: impl Into<String>, bus: BusKind, kind: DeviceKind) -> Self {
        Self {
            module: module.into(),
            vendor: None,
            vendor_ids: Vec::new(),
            device_ids: Vec::new(),
            class: None,
            bus,
            firmware: None,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            priority: DEFAULT_PRIORITY,
            description: String::new(),
            kind,
        }
    }

    pub fn vendor(mut self, vendor: u16) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn vendors(mut self, vendors: &[u16]) -> Self {
        self.vendor_ids = vendors.to_vec();
        self
    }

    pub fn devices(mut self, devices: &[u16]) -> Self {
        self.device_ids = devices.to_vec();
        self
    }

    pub fn class(mut self, class: ClassCode) -> Self {
        self.class = Some(class);
        self
    }

    pub fn firmware(mut self, package: impl Into<String>) -> Self {
        self.firmware = Some(package.into());
        self
    }

    pub fn depends_on(mut self, modules: &[&str]) -> Self {
        self.dependencies = modules.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn conflicts_with(mut self, modules: &[&str]) -> Self {
        self.conflicts = modules.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Evaluate every hardware predicate against `descriptor`.
    ///
    /// The blacklist is not consulted here; it belongs to the database.
    pub fn matches(&self, descriptor: &HardwareDescriptor) -> bool {
        if self.bus != descriptor.bus {
            return false;
        }

        if let Some(vendor) = self.vendor
            && vendor != descriptor.vendor
        {
            return false;
        }

        if !self.vendor_ids.is_empty() && !self.vendor_ids.contains(&descriptor.vendor) {
            return false;
        }

        if !self.device_ids.is_empty() && !self.device_ids.contains(&descriptor.device) {
            return false;
        }

        if let Some(class) = self.class
            && descriptor.class != Some(class)
        {
            return false;
        }

        true
    }

    /// `module: description`, as shown in coverage listings.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.module, self.description)
    }
}
