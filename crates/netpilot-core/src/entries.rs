//! Desired boot and startup entries
//!
//! Derives the `loader.conf` assignments that make loaded drivers persist
//! across reboots and the `rc.conf` assignments that bring interfaces up.

use std::path::Path;

use netpilot_system::{InterfaceKind, InterfaceRecord};

use crate::sync::ConfigEntry;

/// Drivers that are persisted to `loader.conf` once they load successfully.
pub const BOOT_DRIVERS: &[&str] = &[
    // Ethernet
    "if_em", "if_igb", "if_ix", "if_re", "if_bge", "if_alc",
    // USB Ethernet
    "if_axge", "if_axe", "if_ure", "if_cdce",
    // WiFi
    "if_iwm", "if_iwlwifi", "if_ath", "if_ath10k", "if_ath11k", "if_rtwn", "if_rtw88", "if_rtw89", "if_bwi",
    // USB WiFi
    "if_urtwn", "if_run", "if_rum", "if_ural",
];

/// Drivers built on the LinuxKPI compatibility layer.
const LINUXKPI_DRIVERS: &[&str] = &["if_iwlwifi", "if_rtw88", "if_rtw89", "if_ath11k"];

/// `loader.conf` entries for the modules loaded during this run.
///
/// Each allowlisted module gets a `_load` and a `_name` entry. Modules
/// listed more than once are emitted once, at their first position.
pub fn loader_entries<S: AsRef<str>>(loader_path: &Path, modules: &[S]) -> Vec<ConfigEntry> {
    let mut seen: Vec<&str> = Vec::new();
    let mut entries = Vec::new();

    for module in modules.iter().map(AsRef::as_ref) {
        if !BOOT_DRIVERS.contains(&module) || seen.contains(&module) {
            continue;
        }
        seen.push(module);

        entries.push(
            ConfigEntry::new(loader_path, format!("{}_load", module), "YES")
                .with_comment(format!("Load {} network driver at boot", module)),
        );
        entries.push(
            ConfigEntry::new(loader_path, format!("{}_name", module), format!("/boot/modules/{}.ko", module))
                .with_comment(format!("Specify path for {} kernel module", module)),
        );
    }

    if modules.iter().any(|m| LINUXKPI_DRIVERS.contains(&m.as_ref())) {
        entries.push(
            ConfigEntry::new(loader_path, "linuxkpi_load", "YES")
                .with_comment("Linux KPI compatibility layer for modern WiFi drivers"),
        );
        entries.push(
            ConfigEntry::new(loader_path, "lindebugfs_load", "YES")
                .with_comment("Linux debugfs compatibility for WiFi drivers"),
        );
    }

    entries
}

/// `rc.conf` entries that bring `interfaces` up at startup.
///
/// Wired interfaces get `ifconfig_<if>`. Wireless parents get a
/// `wlans_<parent>` clone named after the parent's trailing digit and an
/// `ifconfig_wlanN` line for the clone.
pub fn rc_entries(rc_path: &Path, interfaces: &[InterfaceRecord], dhcp: bool) -> Vec<ConfigEntry> {
    let mut entries = Vec::new();

    for interface in interfaces {
        let name = interface.name.as_str();
        match interface.kind {
            InterfaceKind::Ethernet => {
                let (value, comment) = if dhcp {
                    ("DHCP", format!("Configure {} for DHCP", name))
                } else {
                    ("up", format!("Enable {} ethernet interface", name))
                };
                entries.push(ConfigEntry::new(rc_path, format!("ifconfig_{}", name), value).with_comment(comment));
            }
            InterfaceKind::Wifi => {
                let wlan = wlan_name_for(name);
                entries.push(
                    ConfigEntry::new(rc_path, format!("wlans_{}", name), wlan.as_str())
                        .with_comment(format!("Create {} for {} WiFi interface", wlan, name)),
                );
                let (value, comment) = if dhcp {
                    ("WPA DHCP", format!("Configure {} for WPA and DHCP", wlan))
                } else {
                    ("up", format!("Enable {}", wlan))
                };
                entries.push(ConfigEntry::new(rc_path, format!("ifconfig_{}", wlan), value).with_comment(comment));
            }
        }
    }

    entries
}

/// `wlanN` where N is the last character of `parent` when it is a digit.
fn wlan_name_for(parent: &str) -> String {
    match parent.chars().last().filter(char::is_ascii_digit) {
        Some(digit) => format!("wlan{}", digit),
        None => "wlan0".to_string(),
    }
}
