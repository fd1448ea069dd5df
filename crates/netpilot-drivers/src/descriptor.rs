//! Hardware descriptors produced by discovery
//!
//! A descriptor is the immutable identity of one piece of network
//! hardware: vendor/device ids, class code and bus. Discovery builds them
//! and everything downstream reads them.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Bus a device is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    Pci,
    Usb,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::Pci => write!(f, "PCI"),
            BusKind::Usb => write!(f, "USB"),
        }
    }
}

/// Broad hardware category, used for ordering and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Ethernet,
    Wifi,
    UsbEthernet,
    UsbWifi,
}

impl DeviceKind {
    /// Build the kind for a bus and a wired/wireless flag.
    pub fn for_bus(bus: BusKind, wireless: bool) -> Self {
        match (bus, wireless) {
            (BusKind::Pci, false) => DeviceKind::Ethernet,
            (BusKind::Pci, true) => DeviceKind::Wifi,
            (BusKind::Usb, false) => DeviceKind::UsbEthernet,
            (BusKind::Usb, true) => DeviceKind::UsbWifi,
        }
    }

    pub fn is_wireless(self) -> bool {
        matches!(self, DeviceKind::Wifi | DeviceKind::UsbWifi)
    }

    /// Bus this kind of device lives on.
    pub fn bus(self) -> BusKind {
        match self {
            DeviceKind::Ethernet | DeviceKind::Wifi => BusKind::Pci,
            DeviceKind::UsbEthernet | DeviceKind::UsbWifi => BusKind::Usb,
        }
    }
}

/// Device class code.
///
/// PCI classes carry class and subclass (`0x0200` ethernet, `0x0280`
/// wireless). USB classes are a single byte (`0x02` communications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassCode(pub u16);

impl ClassCode {
    pub const PCI_ETHERNET: ClassCode = ClassCode(0x0200);
    pub const PCI_WIRELESS: ClassCode = ClassCode(0x0280);
    pub const USB_COMMUNICATIONS: ClassCode = ClassCode(0x02);

    /// Whether this class denotes a network device on `bus`.
    pub fn is_network(self, bus: BusKind) -> bool {
        match bus {
            BusKind::Pci => self.0 >> 8 == 0x02,
            BusKind::Usb => self == Self::USB_COMMUNICATIONS,
        }
    }

    /// Whether the code fits the width used on `bus`.
    pub fn fits_bus(self, bus: BusKind) -> bool {
        match bus {
            BusKind::Pci => true,
            BusKind::Usb => self.0 <= 0xff,
        }
    }

    /// Parse a hexadecimal class code (`0x0200`, `0280`, `0x02`).
    pub fn parse(value: &str) -> Result<Self> {
        parse_hex_id(value).map(ClassCode)
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0xff {
            write!(f, "{:#06x}", self.0)
        } else {
            write!(f, "{:#04x}", self.0)
        }
    }
}

impl Serialize for ClassCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a 16-bit hardware id written in hex, with or without `0x`.
pub fn parse_hex_id(value: &str) -> Result<u16> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16).map_err(|_| Error::InvalidHexId {
        value: value.to_string(),
    })
}

fn serialize_hex_id<S: Serializer>(id: &u16, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:#06x}", id))
}

/// Vendors whose PCI parts handled by NetPilot are all wireless.
const WIRELESS_VENDORS: &[u16] = &[0x168c, 0x14e4];

/// Intel device ids known to be wireless adapters.
const INTEL_WIRELESS_DEVICES: &[u16] = &[0x095a, 0x095b, 0x3165, 0x3166, 0x24f3, 0x2723];

const INTEL: u16 = 0x8086;

/// Identifying attributes of one piece of network hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardwareDescriptor {
    #[serde(serialize_with = "serialize_hex_id")]
    pub vendor: u16,
    #[serde(serialize_with = "serialize_hex_id")]
    pub device: u16,
    pub class: Option<ClassCode>,
    pub bus: BusKind,
    pub vendor_name: Option<String>,
    pub device_name: Option<String>,
    /// Bus selector, e.g. `em0@pci0:0:25:0`
    pub bus_address: Option<String>,
    pub kind: DeviceKind,
}

impl HardwareDescriptor {
    /// Describe a PCI device.
    pub fn pci(vendor: u16, device: u16, class: ClassCode) -> Self {
        Self::new(vendor, device, Some(class), BusKind::Pci)
    }

    /// Describe a USB device. USB descriptors do not always carry a class.
    pub fn usb(vendor: u16, product: u16, class: Option<ClassCode>) -> Self {
        Self::new(vendor, product, class, BusKind::Usb)
    }

    fn new(vendor: u16, device: u16, class: Option<ClassCode>, bus: BusKind) -> Self {
        let kind = classify(vendor, device, class, bus);
        Self {
            vendor,
            device,
            class,
            bus,
            vendor_name: None,
            device_name: None,
            bus_address: None,
            kind,
        }
    }

    pub fn with_names(mut self, vendor_name: impl Into<String>, device_name: impl Into<String>) -> Self {
        self.vendor_name = Some(vendor_name.into());
        self.device_name = Some(device_name.into());
        self
    }

    pub fn with_bus_address(mut self, address: impl Into<String>) -> Self {
        self.bus_address = Some(address.into());
        self
    }

    /// Override the heuristic classification.
    pub fn with_kind(mut self, kind: DeviceKind) -> Self {
        self.kind = kind;
        self
    }

    /// `0xVVVV:0xDDDD`
    pub fn id_pair(&self) -> String {
        format!("{:#06x}:{:#06x}", self.vendor, self.device)
    }

    /// Human-readable label for logs and reports.
    pub fn label(&self) -> String {
        let vendor = self.vendor_name.as_deref().unwrap_or("Unknown");
        match &self.device_name {
            Some(device) => format!("{} {}", vendor, device),
            None => format!("{} {:#06x}", vendor, self.vendor),
        }
    }
}

/// Heuristic wired/wireless classification from ids alone.
fn classify(vendor: u16, device: u16, class: Option<ClassCode>, bus: BusKind) -> DeviceKind {
    let wireless = (bus == BusKind::Pci && class == Some(ClassCode::PCI_WIRELESS))
        || WIRELESS_VENDORS.contains(&vendor)
        || (vendor == INTEL && INTEL_WIRELESS_DEVICES.contains(&device));
    DeviceKind::for_bus(bus, wireless)
}
