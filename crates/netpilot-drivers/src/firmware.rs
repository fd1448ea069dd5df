//! Firmware package resolution
//!
//! One driver module often serves many silicon revisions that each need a
//! different firmware blob. Rules name a generic package; the override
//! tables below refine it per device id, many ids to one package.

use serde::Serialize;

use crate::descriptor::HardwareDescriptor;
use crate::rule::DriverRule;

/// Device-specific packages for one vendor's driver family.
struct FirmwareFamily {
    vendor: u16,
    /// Substring of the rule's generic package that selects this family
    marker: &'static str,
    overrides: &'static [(u16, &'static str)],
}

const IWLWIFI_AX210: &str = "wifi-firmware-iwlwifi-kmod-ax210";
const IWLWIFI_22000: &str = "wifi-firmware-iwlwifi-kmod-22000";
const IWLWIFI_9000: &str = "wifi-firmware-iwlwifi-kmod-9000";
const IWLWIFI_8000: &str = "wifi-firmware-iwlwifi-kmod-8000";
const IWLWIFI_7000: &str = "wifi-firmware-iwlwifi-kmod-7000";

const FAMILIES: &[FirmwareFamily] = &[
    FirmwareFamily {
        vendor: 0x8086,
        marker: "iwlwifi",
        overrides: &[
            (0x2725, IWLWIFI_AX210),
            (0x51f0, IWLWIFI_AX210),
            (0x51f1, IWLWIFI_AX210),
            (0x54f0, IWLWIFI_AX210),
            (0x7af0, IWLWIFI_AX210),
            (0x2723, IWLWIFI_22000),
            (0x271b, IWLWIFI_22000),
            (0x271c, IWLWIFI_22000),
            (0x30dc, IWLWIFI_22000),
            (0x31dc, IWLWIFI_22000),
            (0x43f0, IWLWIFI_22000),
            (0xa0f0, IWLWIFI_22000),
            (0x9df0, IWLWIFI_9000),
            (0x02f0, IWLWIFI_9000),
            (0x06f0, IWLWIFI_9000),
            (0x34f0, IWLWIFI_9000),
            (0x24fd, IWLWIFI_8000),
            (0x24fb, IWLWIFI_8000),
            (0x3165, IWLWIFI_8000),
            (0x3166, IWLWIFI_8000),
            (0x095a, IWLWIFI_7000),
            (0x095b, IWLWIFI_7000),
            (0x24f3, IWLWIFI_7000),
            (0x24f4, IWLWIFI_7000),
            (0x24f5, IWLWIFI_7000),
            (0x24f6, IWLWIFI_7000),
        ],
    },
    FirmwareFamily {
        vendor: 0x168c,
        marker: "ath10k",
        overrides: &[
            (0x003c, "wifi-firmware-ath10k-kmod-qca988x_hw20"),
            (0x0041, "wifi-firmware-ath10k-kmod-qca6174_hw30"),
            (0x003e, "wifi-firmware-ath10k-kmod-qca6174_hw21"),
            (0x0040, "wifi-firmware-ath10k-kmod-qca99x0_hw20"),
            (0x0046, "wifi-firmware-ath10k-kmod-qca9377_hw10"),
            (0x0056, "wifi-firmware-ath10k-kmod-qca9888_hw20"),
        ],
    },
    FirmwareFamily {
        vendor: 0x17cb,
        marker: "ath11k",
        overrides: &[
            (0x1101, "wifi-firmware-ath11k-kmod-qca6390_hw20"),
            (0x1103, "wifi-firmware-ath11k-kmod-wcn6855_hw20"),
            (0x1104, "wifi-firmware-ath11k-kmod-qcn9074_hw10"),
        ],
    },
    FirmwareFamily {
        vendor: 0x10ec,
        marker: "rtw88",
        overrides: &[
            (0x8822, "wifi-firmware-rtw88-kmod-rtw8822b"),
            (0x8821, "wifi-firmware-rtw88-kmod-rtw8821c"),
            (0xb822, "wifi-firmware-rtw88-kmod-rtw8822b"),
            (0xc822, "wifi-firmware-rtw88-kmod-rtw8822c"),
            (0x8723, "wifi-firmware-rtw88-kmod-rtw8723d"),
            (0xb723, "wifi-firmware-rtw88-kmod-rtw8703b"),
        ],
    },
    FirmwareFamily {
        vendor: 0x10ec,
        marker: "rtw89",
        overrides: &[
            (0x8852, "wifi-firmware-rtw89-kmod-rtw8852a"),
            (0x8851, "wifi-firmware-rtw89-kmod-rtw8851b"),
            (0xc852, "wifi-firmware-rtw89-kmod-rtw8852c"),
            (0xc851, "wifi-firmware-rtw89-kmod-rtw8852b"),
        ],
    },
];

/// Both firmware tiers for a matched device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmwarePlan {
    /// Most specific package known for the device
    pub specific: String,
    /// The rule's generic package
    pub generic: String,
}

impl FirmwarePlan {
    /// Whether a failed `specific` install can be retried with `generic`.
    pub fn has_fallback(&self) -> bool {
        self.specific != self.generic
    }
}

/// Compute both firmware tiers, or `None` when the rule needs no firmware.
pub fn plan_firmware(descriptor: &HardwareDescriptor, rule: &DriverRule) -> Option<FirmwarePlan> {
    let generic = rule.firmware.as_deref()?;
    let specific = device_override(descriptor, rule, generic).unwrap_or(generic);
    Some(FirmwarePlan {
        specific: specific.to_string(),
        generic: generic.to_string(),
    })
}

/// Most specific firmware package for `descriptor` under `rule`.
pub fn resolve_firmware(descriptor: &HardwareDescriptor, rule: &DriverRule) -> Option<String> {
    plan_firmware(descriptor, rule).map(|plan| plan.specific)
}

fn device_override(
    descriptor: &HardwareDescriptor,
    rule: &DriverRule,
    generic: &str,
) -> Option<&'static str> {
    let vendor = rule.vendor?;
    FAMILIES
        .iter()
        .filter(|family| family.vendor == vendor && generic.contains(family.marker))
        .flat_map(|family| family.overrides.iter())
        .find(|(device, _)| *device == descriptor.device)
        .map(|(_, package)| *package)
}
