//! The `--show-coverage` report

use colored::Colorize;

use netpilot_drivers::{CoverageSummary, RuleDatabase};

use crate::error::Result;

/// Print the hardware the built-in database supports.
pub fn run_coverage(json: bool) -> Result<()> {
    let coverage = RuleDatabase::builtin()?.coverage();

    if json {
        println!("{}", serde_json::to_string_pretty(&coverage)?);
    } else {
        print!("{}", format_coverage(&coverage));
    }
    Ok(())
}

fn format_coverage(coverage: &CoverageSummary) -> String {
    let mut out = format!("{}\n", "NetPilot Hardware Coverage".bold());

    for (title, entries) in [
        ("Ethernet (PCI)", &coverage.ethernet_pci),
        ("WiFi (PCI)", &coverage.wifi_pci),
        ("Ethernet (USB)", &coverage.ethernet_usb),
        ("WiFi (USB)", &coverage.wifi_usb),
    ] {
        out.push_str(&format!("\n{} ({}):\n", title.bold(), entries.len()));
        for entry in entries {
            out.push_str(&format!("  {} {}\n", "+".green(), entry));
        }
    }

    out.push_str(&format!("\n{}:\n", "Firmware packages".bold()));
    if coverage.firmware_packages.is_empty() {
        out.push_str(&format!("  {}\n", "None".dimmed()));
    }
    for package in &coverage.firmware_packages {
        out.push_str(&format!("  {} {}\n", "+".green(), package.cyan()));
    }

    out.push_str(&format!("\n{} {} driver rules\n", "Total:".bold(), coverage.total()));
    out
}
