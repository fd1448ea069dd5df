//! Descriptors and interface records for hardware the built-in table knows.
//!
//! The comment on each builder names the rule it resolves to.

use netpilot_drivers::{ClassCode, HardwareDescriptor};
use netpilot_system::{InterfaceKind, InterfaceRecord, InterfaceStatus, WirelessNetwork};

/// `if_igb`, no firmware.
pub fn intel_i350() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x8086, 0x1521, ClassCode::PCI_ETHERNET)
        .with_names("Intel Corporation", "I350 Gigabit Network Connection")
        .with_bus_address("igb0@pci0:3:0:0")
}

/// `if_em` (I219 rule), no firmware.
pub fn intel_i219() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x8086, 0x15b8, ClassCode::PCI_ETHERNET)
        .with_names("Intel Corporation", "Ethernet Connection (2) I219-V")
        .with_bus_address("em0@pci0:0:31:6")
}

/// `if_re`, no firmware.
pub fn realtek_rtl8168() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x10ec, 0x8168, ClassCode::PCI_ETHERNET)
        .with_names("Realtek Semiconductor Co., Ltd.", "RTL8111/8168/8411 PCI Express Gigabit Ethernet")
        .with_bus_address("re0@pci0:2:0:0")
}

/// `if_axge` over `if_axe`.
pub fn asix_ax88179() -> HardwareDescriptor {
    HardwareDescriptor::usb(0x0b95, 0x1790, Some(ClassCode(0xff)))
        .with_names("ASIX Elec. Corp.", "AX88179")
        .with_bus_address("ugen0.3")
}

/// `if_iwlwifi` AX210 rule; specific and generic firmware coincide.
pub fn intel_ax210() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x8086, 0x2725, ClassCode::PCI_WIRELESS)
        .with_names("Intel Corporation", "Wi-Fi 6E(802.11ax) AX210/AX1675* 2x2")
        .with_bus_address("iwlwifi0@pci0:4:0:0")
}

/// `if_rtw88` with a device firmware (`rtw8822b`) and a generic fallback.
pub fn realtek_rtl8822be() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x10ec, 0xb822, ClassCode::PCI_WIRELESS)
        .with_names("Realtek Semiconductor Co., Ltd.", "RTL8822BE 802.11a/b/g/n/ac WiFi adapter")
        .with_bus_address("rtw880@pci0:5:0:0")
}

/// `if_ath10k` with a device firmware (`qca6174_hw21`) and a generic fallback.
pub fn atheros_qca6174() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x168c, 0x003e, ClassCode::PCI_WIRELESS)
        .with_names("Qualcomm Atheros", "QCA6174 802.11ac Wireless Network Adapter")
}

/// Matches no rule.
pub fn virtio_net() -> HardwareDescriptor {
    HardwareDescriptor::pci(0x1af4, 0x1000, ClassCode::PCI_ETHERNET).with_names("Red Hat, Inc.", "Virtio network device")
}

/// An active wired interface with an address.
pub fn ethernet_interface(name: &str) -> InterfaceRecord {
    let mut record = InterfaceRecord::new(name, InterfaceKind::Ethernet).with_status(InterfaceStatus::Active);
    record.mac = Some("00:1b:21:3a:4f:10".to_string());
    record.mtu = Some(1500);
    record.addresses = vec!["192.168.1.20".to_string()];
    record.speed = Some("1G".to_string());
    record.duplex = Some("full".to_string());
    record
}

/// A wireless parent interface that is not associated.
pub fn wifi_interface(name: &str) -> InterfaceRecord {
    let mut record = InterfaceRecord::new(name, InterfaceKind::Wifi).with_status(InterfaceStatus::NoCarrier);
    record.mac = Some("a4:c3:f0:85:12:9e".to_string());
    record.mtu = Some(1500);
    record
}

pub fn wireless_network(ssid: &str, signal_dbm: i32, encryption: &str) -> WirelessNetwork {
    WirelessNetwork {
        ssid: ssid.to_string(),
        bssid: "f4:92:bf:1c:30:7a".to_string(),
        signal_dbm,
        channel: 36,
        encryption: encryption.to_string(),
    }
}
