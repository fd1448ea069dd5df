//! Startup self-check for driver tables
//!
//! A malformed rule is a programming error in the table, so the check runs
//! once when a [`RuleDatabase`](crate::RuleDatabase) is built and refuses
//! the whole table on the first violation.

use crate::descriptor::BusKind;
use crate::rule::DriverRule;
use crate::{Error, Result};

/// Validate every rule, reporting the first violation.
pub fn validate_rules(rules: &[DriverRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if let Some(reason) = check_rule(rule) {
            return Err(Error::InvalidRule {
                index,
                module: rule.module.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Return the reason `rule` is malformed, if it is.
fn check_rule(rule: &DriverRule) -> Option<String> {
    if rule.module.trim().is_empty() {
        return Some("module name is empty".to_string());
    }

    if rule.vendor.is_some() && !rule.vendor_ids.is_empty() {
        return Some("declares both an exact vendor and a vendor set".to_string());
    }

    if rule.kind.bus() != rule.bus {
        return Some(format!(
            "{:?} hardware cannot be matched on the {} bus",
            rule.kind, rule.bus
        ));
    }

    if rule.bus == BusKind::Pci && !rule.vendor_ids.is_empty() {
        return Some("vendor sets are only used by USB rules".to_string());
    }

    if let Some(class) = rule.class
        && !class.fits_bus(rule.bus)
    {
        return Some(format!("class {} is not a {} class code", class, rule.bus));
    }

    if rule.dependencies.iter().any(|dep| dep == &rule.module) {
        return Some("depends on itself".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::builtin_rules;
    use crate::descriptor::{ClassCode, DeviceKind};

    #[test]
    fn test_builtin_table_is_valid() {
        validate_rules(&builtin_rules()).unwrap();
    }

    #[test]
    fn test_rejects_usb_kind_on_pci_rule() {
        let rules = vec![DriverRule::pci("if_bad", DeviceKind::UsbWifi)];
        let err = validate_rules(&rules).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { index: 0, .. }));
    }

    #[test]
    fn test_rejects_vendor_and_vendor_set() {
        let rules = vec![
            DriverRule::usb("if_ok", DeviceKind::UsbEthernet).vendors(&[0x0b95]),
            DriverRule::usb("if_bad", DeviceKind::UsbEthernet)
                .vendor(0x0b95)
                .vendors(&[0x0b95]),
        ];
        match validate_rules(&rules).unwrap_err() {
            Error::InvalidRule { index, module, .. } => {
                assert_eq!(index, 1);
                assert_eq!(module, "if_bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_vendor_set_on_pci_rule() {
        let rules = vec![DriverRule::pci("if_bad", DeviceKind::Ethernet).vendors(&[0x8086])];
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn test_rejects_wide_class_on_usb_rule() {
        let rules = vec![DriverRule::usb("if_bad", DeviceKind::UsbEthernet).class(ClassCode::PCI_ETHERNET)];
        let err = validate_rules(&rules).unwrap_err();
        assert!(err.to_string().contains("0x0200"));
    }

    #[test]
    fn test_rejects_empty_module() {
        let rules = vec![DriverRule::pci("  ", DeviceKind::Ethernet)];
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn test_rejects_self_dependency() {
        let rules = vec![DriverRule::pci("if_loop", DeviceKind::Wifi).depends_on(&["if_loop"])];
        assert!(validate_rules(&rules).is_err());
    }
}
