//! Built-in driver table - SINGLE SOURCE OF TRUTH
//!
//! Declaration order matters: when two rules match a device with the same
//! priority, the one declared first wins.

use crate::descriptor::{ClassCode, DeviceKind};
use crate::rule::DriverRule;

/// Number of built-in rules.
pub const BUILTIN_RULE_COUNT: usize = 31;

const INTEL: u16 = 0x8086;
const REALTEK: u16 = 0x10ec;
const BROADCOM: u16 = 0x14e4;
const ATTANSIC: u16 = 0x1969;
const ATHEROS: u16 = 0x168c;
const QUALCOMM: u16 = 0x17cb;
const MEDIATEK: u16 = 0x14c3;

/// Compatibility shims needed by drivers ported from Linux.
const LINUXKPI: &[&str] = &["linuxkpi"];
const LINUXKPI_DEBUGFS: &[&str] = &["linuxkpi", "lindebugfs"];

/// Modules that must never be selected.
pub fn builtin_blacklist() -> Vec<&'static str> {
    vec![
        // Superseded by if_iwm
        "if_iwn",
    ]
}

/// Returns every built-in driver rule in declaration order.
pub fn builtin_rules() -> Vec<DriverRule> {
    let mut rules = Vec::with_capacity(BUILTIN_RULE_COUNT);
    rules.extend(ethernet_rules());
    rules.extend(usb_ethernet_rules());
    rules.extend(wifi_rules());
    rules.extend(usb_wifi_rules());
    rules
}

fn ethernet_rules() -> Vec<DriverRule> {
    vec![
        DriverRule::pci("if_igb", DeviceKind::Ethernet)
            .vendor(INTEL)
            .devices(&[
                0x10a7, 0x10a9, 0x10d6, 0x10e6, 0x10e7, 0x10e8, 0x150a, 0x1518, 0x1521, 0x1522,
                0x1523, 0x1524,
            ])
            .priority(10)
            .describe("Intel 82575/82576/82580/I350/I354 Gigabit Ethernet"),
        DriverRule::pci("if_em", DeviceKind::Ethernet)
            .vendor(INTEL)
            .devices(&[
                0x10d3, 0x1502, 0x1533, 0x150c, 0x10de, 0x10df, 0x10ef, 0x1049, 0x104a, 0x104b,
                0x104c, 0x104d,
            ])
            .priority(20)
            .describe("Intel 82571/82572/82573/82574/82583 Ethernet"),
        DriverRule::pci("if_ix", DeviceKind::Ethernet)
            .vendor(INTEL)
            .devices(&[
                0x10fb, 0x10f8, 0x154d, 0x1528, 0x154a, 0x154f, 0x1557, 0x1558, 0x1560, 0x1563,
                0x15aa, 0x15ab,
            ])
            .priority(15)
            .describe("Intel 82598/82599/X540/X550 10 Gigabit Ethernet"),
        DriverRule::pci("if_em", DeviceKind::Ethernet)
            .vendor(INTEL)
            .devices(&[
                0x156f, 0x1570, 0x15b7, 0x15b8, 0x15b9, 0x15bb, 0x15bc, 0x15bd, 0x15be, 0x0d4e,
                0x0d4f, 0x0d4c,
            ])
            .priority(5)
            .describe("Intel I219/I225/I226 Gigabit Ethernet"),
        DriverRule::pci("if_re", DeviceKind::Ethernet)
            .vendor(REALTEK)
            .devices(&[
                0x8168, 0x8169, 0x8136, 0x8167, 0x8161, 0x8162, 0x8125, 0x3000, 0x8129, 0x8139,
            ])
            .priority(25)
            .describe("Realtek RTL8139/8169/8168/8111/8125 Ethernet"),
        DriverRule::pci("if_bge", DeviceKind::Ethernet)
            .vendor(BROADCOM)
            .class(ClassCode::PCI_ETHERNET)
            .priority(30)
            .describe("Broadcom BCM57xx Gigabit Ethernet"),
        DriverRule::pci("if_alc", DeviceKind::Ethernet)
            .vendor(ATTANSIC)
            .class(ClassCode::PCI_ETHERNET)
            .priority(35)
            .describe("Atheros/Qualcomm AR813x/AR815x/AR816x/AR817x Ethernet"),
    ]
}

fn usb_ethernet_rules() -> Vec<DriverRule> {
    vec![
        DriverRule::usb("if_axge", DeviceKind::UsbEthernet)
            .vendors(&[0x0b95])
            .priority(40)
            .describe("ASIX AX88179/AX88178A USB 3.0 Gigabit Ethernet"),
        DriverRule::usb("if_axe", DeviceKind::UsbEthernet)
            .vendors(&[0x0b95, 0x077b, 0x2001])
            .priority(45)
            .describe("ASIX AX88x72 USB 2.0 Ethernet"),
        DriverRule::usb("if_ure", DeviceKind::UsbEthernet)
            .vendors(&[0x0bda, 0x0411])
            .priority(50)
            .describe("Realtek RTL8152/RTL8153 USB Ethernet"),
        DriverRule::usb("if_cdce", DeviceKind::UsbEthernet)
            .class(ClassCode::USB_COMMUNICATIONS)
            .priority(55)
            .describe("USB CDC Ethernet"),
    ]
}

fn wifi_rules() -> Vec<DriverRule> {
    vec![
        DriverRule::pci("if_iwlwifi", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[
                0x2723, 0x2725, 0x271b, 0x271c, 0x2720, 0x30dc, 0x31dc, 0x9df0, 0x02f0, 0x06f0,
                0x34f0, 0x43f0, 0xa0f0, 0x2526, 0x51f0, 0x51f1, 0x54f0, 0x7af0,
            ])
            .firmware("wifi-firmware-iwlwifi-kmod")
            .depends_on(LINUXKPI_DEBUGFS)
            .priority(60)
            .describe("Intel WiFi 6E/6/AC (AX200/AX201/AX210/AC9560/AC9260/BE200)"),
        DriverRule::pci("if_iwlwifi", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[0x2725, 0x51f0, 0x51f1, 0x54f0, 0x7af0])
            .firmware("wifi-firmware-iwlwifi-kmod-ax210")
            .depends_on(LINUXKPI_DEBUGFS)
            .priority(58)
            .describe("Intel WiFi 6E AX210 series"),
        DriverRule::pci("if_iwlwifi", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[0x2723, 0x271b, 0x271c, 0x30dc, 0x31dc, 0x43f0, 0xa0f0])
            .firmware("wifi-firmware-iwlwifi-kmod-22000")
            .depends_on(LINUXKPI_DEBUGFS)
            .priority(59)
            .describe("Intel WiFi 22000 series (AX200/AX201)"),
        DriverRule::pci("if_iwlwifi", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[0x9df0, 0x02f0, 0x06f0, 0x34f0])
            .firmware("wifi-firmware-iwlwifi-kmod-9000")
            .depends_on(LINUXKPI_DEBUGFS)
            .priority(61)
            .describe("Intel WiFi 9000 series (9560/9260)"),
        DriverRule::pci("if_iwm", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[0x095a, 0x095b, 0x24f3, 0x24f4, 0x24f5, 0x24f6])
            .firmware("wifi-firmware-iwlwifi-kmod-7000")
            .conflicts_with(&["if_iwlwifi"])
            .priority(65)
            .describe("Intel WiFi 7000 series (7260/7265)"),
        DriverRule::pci("if_iwm", DeviceKind::Wifi)
            .vendor(INTEL)
            .devices(&[0x24fd, 0x24fb, 0x3165, 0x3166])
            .firmware("wifi-firmware-iwlwifi-kmod-8000")
            .conflicts_with(&["if_iwlwifi"])
            .priority(66)
            .describe("Intel WiFi 8000 series (8260/8265/3165)"),
        DriverRule::pci("if_ath12k", DeviceKind::Wifi)
            .vendor(QUALCOMM)
            .devices(&[0x1107, 0x1109])
            .firmware("wifi-firmware-ath12k-kmod")
            .depends_on(LINUXKPI)
            .priority(68)
            .describe("Qualcomm Atheros WiFi 6E/7 (WCN7850)"),
        DriverRule::pci("if_ath11k", DeviceKind::Wifi)
            .vendor(QUALCOMM)
            .devices(&[0x1101, 0x1103, 0x1104])
            .firmware("wifi-firmware-ath11k-kmod")
            .depends_on(LINUXKPI)
            .priority(70)
            .describe("Qualcomm Atheros WiFi 6E (QCA6390/QCA6490)"),
        DriverRule::pci("if_ath10k", DeviceKind::Wifi)
            .vendor(ATHEROS)
            .devices(&[0x003c, 0x0041, 0x003e, 0x0040, 0x0046, 0x0056])
            .firmware("wifi-firmware-ath10k-kmod")
            .priority(75)
            .describe("Qualcomm Atheros 802.11ac (QCA988x/QCA99x0/QCA6174/QCA9377)"),
        DriverRule::pci("if_rtw89", DeviceKind::Wifi)
            .vendor(REALTEK)
            .devices(&[0x8852, 0x8851, 0xc852, 0xc851])
            .firmware("wifi-firmware-rtw89-kmod")
            .depends_on(LINUXKPI)
            .priority(85)
            .describe("Realtek WiFi 6 (RTL8852AE/RTL8852BE/RTL8851B)"),
        DriverRule::pci("if_rtw88", DeviceKind::Wifi)
            .vendor(REALTEK)
            .devices(&[0x8822, 0x8821, 0xb822, 0xc822, 0x8723, 0xb723])
            .firmware("wifi-firmware-rtw88-kmod")
            .depends_on(LINUXKPI)
            .priority(90)
            .describe("Realtek WiFi 5 (RTL8822BE/RTL8822CE/RTL8723DE)"),
        DriverRule::pci("if_mt76", DeviceKind::Wifi)
            .vendor(MEDIATEK)
            .devices(&[0x7915, 0x7906, 0x7922, 0x7996])
            .firmware("wifi-firmware-mt76-kmod")
            .depends_on(LINUXKPI)
            .priority(95)
            .describe("MediaTek MT76xx WiFi 6/6E"),
        DriverRule::pci("if_rtwn", DeviceKind::Wifi)
            .vendor(REALTEK)
            .devices(&[0x8176, 0x8178, 0x8188, 0x8192])
            .priority(95)
            .describe("Realtek 802.11n (RTL8188/RTL8192 series)"),
        DriverRule::pci("if_bwi", DeviceKind::Wifi)
            .vendor(BROADCOM)
            .devices(&[0x4311, 0x4312, 0x4315, 0x4318, 0x4319])
            .priority(100)
            .describe("Broadcom BCM43xx 802.11bg"),
        DriverRule::pci("if_ath", DeviceKind::Wifi)
            .vendor(ATHEROS)
            .priority(105)
            .describe("Atheros 802.11abgn (AR5xxx/AR9xxx series)"),
    ]
}

fn usb_wifi_rules() -> Vec<DriverRule> {
    vec![
        DriverRule::usb("if_urtwn", DeviceKind::UsbWifi)
            .vendors(&[0x0bda, 0x2019, 0x20f4, 0x2001, 0x050d])
            .firmware("wifi-firmware-rtw88-kmod")
            .priority(110)
            .describe("Realtek RTL8188/RTL8192/RTL8723 USB WiFi"),
        DriverRule::usb("if_mt7601u", DeviceKind::UsbWifi)
            .vendors(&[0x148f, 0x0e8d])
            .firmware("wifi-firmware-mt7601u-kmod")
            .priority(115)
            .describe("MediaTek MT7601U USB WiFi"),
        DriverRule::usb("if_run", DeviceKind::UsbWifi)
            .vendors(&[0x148f, 0x0df6, 0x0789, 0x083a, 0x2019])
            .priority(120)
            .describe("Ralink/MediaTek RT2870/RT3070/RT5370 USB WiFi (legacy)"),
        DriverRule::usb("if_rum", DeviceKind::UsbWifi)
            .vendors(&[0x148f, 0x0b05, 0x050d, 0x0769, 0x0411])
            .priority(125)
            .describe("Ralink RT2501/RT2601 USB WiFi (legacy)"),
        DriverRule::usb("if_ural", DeviceKind::UsbWifi)
            .vendors(&[0x148f, 0x0b05, 0x050d, 0x13b1, 0x0411])
            .priority(130)
            .describe("Ralink RT2500 USB WiFi (legacy)"),
    ]
}
