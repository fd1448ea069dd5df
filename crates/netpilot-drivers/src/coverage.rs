//! Hardware coverage summary

use serde::Serialize;

use crate::descriptor::DeviceKind;
use crate::rule::DriverRule;

/// Rules grouped by hardware category, each entry `module: description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub ethernet_pci: Vec<String>,
    pub wifi_pci: Vec<String>,
    pub ethernet_usb: Vec<String>,
    pub wifi_usb: Vec<String>,
    /// Distinct generic firmware packages, sorted
    pub firmware_packages: Vec<String>,
}

impl CoverageSummary {
    pub fn from_rules(rules: &[DriverRule]) -> Self {
        let mut summary = Self::default();
        for rule in rules {
            let bucket = match rule.kind {
                DeviceKind::Ethernet => &mut summary.ethernet_pci,
                DeviceKind::Wifi => &mut summary.wifi_pci,
                DeviceKind::UsbEthernet => &mut summary.ethernet_usb,
                DeviceKind::UsbWifi => &mut summary.wifi_usb,
            };
            bucket.push(rule.summary());

            if let Some(package) = &rule.firmware
                && !summary.firmware_packages.contains(package)
            {
                summary.firmware_packages.push(package.clone());
            }
        }
        summary.firmware_packages.sort();
        summary
    }

    /// Total number of rules covered.
    pub fn total(&self) -> usize {
        self.ethernet_pci.len() + self.wifi_pci.len() + self.ethernet_usb.len() + self.wifi_usb.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{BUILTIN_RULE_COUNT, builtin_rules};

    #[test]
    fn test_builtin_coverage_counts() {
        let summary = CoverageSummary::from_rules(&builtin_rules());
        assert_eq!(summary.total(), BUILTIN_RULE_COUNT);
        assert_eq!(summary.ethernet_pci.len(), 7);
        assert_eq!(summary.ethernet_usb.len(), 4);
        assert_eq!(summary.wifi_pci.len(), 15);
        assert_eq!(summary.wifi_usb.len(), 5);
    }

    #[test]
    fn test_entries_use_rule_summary() {
        let rules = vec![DriverRule::pci("if_re", DeviceKind::Ethernet).describe("Realtek Gigabit Ethernet")];
        let summary = CoverageSummary::from_rules(&rules);
        assert_eq!(summary.ethernet_pci, vec!["if_re: Realtek Gigabit Ethernet"]);
        assert!(summary.firmware_packages.is_empty());
    }

    #[test]
    fn test_firmware_packages_deduplicated() {
        let rules = vec![
            DriverRule::pci("if_rtw88", DeviceKind::Wifi).firmware("wifi-firmware-rtw88-kmod"),
            DriverRule::usb("if_urtwn", DeviceKind::UsbWifi).firmware("wifi-firmware-rtw88-kmod"),
            DriverRule::pci("if_ath10k", DeviceKind::Wifi).firmware("wifi-firmware-ath10k-kmod"),
        ];
        let summary = CoverageSummary::from_rules(&rules);
        assert_eq!(
            summary.firmware_packages,
            vec!["wifi-firmware-ath10k-kmod", "wifi-firmware-rtw88-kmod"]
        );
    }
}
