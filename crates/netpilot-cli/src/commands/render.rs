//! Human-readable report rendering

use std::fmt::Write;

use colored::{ColoredString, Colorize};

use netpilot_core::{
    BatchReport, ChangeAction, ConfigPreview, FileSyncReport, FirmwareOutcome, LoadOutcome, RunReport, SkipReason,
};
use netpilot_system::{InterfaceKind, InterfaceRecord, InterfaceStatus};

pub fn format_report(report: &RunReport, verbose: bool) -> String {
    let mut out = String::new();
    let info = &report.discovery_info;
    let stats = &report.statistics;

    let _ = writeln!(out, "{}", "NetPilot Discovery Results".bold());
    let _ = writeln!(out, "  {}: {:.2}s", "Discovery time".dimmed(), info.duration_secs);
    let _ = writeln!(out, "  {}: {}", "OS release".dimmed(), info.os_release);
    let _ = writeln!(
        out,
        "  {}: {} PCI + {} USB",
        "Devices".dimmed(),
        stats.pci_devices,
        stats.usb_devices
    );
    let _ = writeln!(
        out,
        "  {}: {} Ethernet + {} WiFi ({} active)",
        "Interfaces".dimmed(),
        stats.ethernet_interfaces,
        stats.wifi_interfaces,
        stats.active_interfaces
    );

    if let Some(batch) = &report.driver_results {
        let _ = writeln!(
            out,
            "  {}: {} loaded, {} failed",
            "Modules".dimmed(),
            stats.modules_loaded,
            stats.modules_failed
        );
        format_drivers(&mut out, batch, verbose);
    }

    let _ = writeln!(out, "\n{}:", "Network Interfaces".bold());
    if report.interfaces.is_empty() {
        let _ = writeln!(out, "  {}", "None".dimmed());
    }
    for interface in &report.interfaces {
        format_interface(&mut out, interface, report.available_networks.get(&interface.name).map(Vec::len));
    }

    if !report.wlan_interfaces_created.is_empty() {
        let _ = writeln!(out, "\n{}:", "WLAN interfaces created".bold());
        for wlan in &report.wlan_interfaces_created {
            let _ = writeln!(out, "  {} {}", "+".green(), wlan.cyan());
        }
    }

    if !report.available_networks.is_empty() {
        let _ = writeln!(out, "\n{}:", "Wireless networks".bold());
        for (interface, networks) in &report.available_networks {
            let _ = writeln!(out, "  {} ({}):", interface.cyan(), networks.len());
            for network in networks {
                let _ = writeln!(
                    out,
                    "    {} {} dBm, channel {}, {}",
                    network.ssid,
                    network.signal_dbm,
                    network.channel,
                    network.encryption
                );
            }
        }
    }

    if !report.dhcp_configuration.is_empty() {
        let _ = writeln!(out, "\n{}:", "DHCP".bold());
        for result in &report.dhcp_configuration {
            match &result.error {
                None => {
                    let _ = writeln!(out, "  {} {} configured", "+".green(), result.interface.cyan());
                }
                Some(error) => {
                    let _ = writeln!(out, "  {} {}: {}", "!".red(), result.interface.cyan(), error);
                }
            }
        }
    }

    if !report.system_configuration.is_empty() {
        let _ = writeln!(out, "\n{}:", "System configuration".bold());
        for file in &report.system_configuration {
            format_sync(&mut out, file);
        }
    }

    out
}

fn format_drivers(out: &mut String, batch: &BatchReport, verbose: bool) {
    let loaded: Vec<_> = batch.loaded().collect();
    if !loaded.is_empty() {
        let _ = writeln!(out, "\n{}:", "Loaded drivers".bold());
        for result in loaded {
            if let Some(module) = result.outcome.loaded_module() {
                let _ = writeln!(out, "  {} {} for {} ({})", "+".green(), module.cyan(), result.device, result.id);
            }
        }
    }

    let firmware: Vec<_> = batch.firmware().collect();
    if !firmware.is_empty() {
        let _ = writeln!(out, "\n{}:", "Firmware".bold());
        for (module, outcome) in firmware {
            let line = match outcome {
                FirmwareOutcome::Installed { package } => format!("{} {} installed", "+".green(), package),
                FirmwareOutcome::AlreadyInstalled { package } => {
                    format!("{} {} already installed", "=".dimmed(), package)
                }
                FirmwareOutcome::FallbackInstalled { package } => {
                    format!("{} {} installed as fallback", "~".yellow(), package)
                }
                FirmwareOutcome::Failed { specific, cause, .. } => {
                    format!("{} {} failed: {}", "!".red(), specific, cause)
                }
            };
            let _ = writeln!(out, "  {} ({})", line, module);
        }
    }

    let failed: Vec<_> = batch.failed().collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\n{}:", "Failed drivers".red().bold());
        for result in failed {
            if let LoadOutcome::Failed { module, cause } = &result.outcome {
                let _ = writeln!(out, "  {} {} for {}: {}", "!".red(), module, result.device, cause);
            }
        }
    }

    if !batch.conflicts.is_empty() {
        let _ = writeln!(out, "\n{}:", "Conflicting modules".yellow().bold());
        for conflict in &batch.conflicts {
            let _ = writeln!(out, "  {} {} and {}", "~".yellow(), conflict.module, conflict.conflicts_with);
        }
    }

    let skipped: Vec<_> = batch.skipped().collect();
    if skipped.is_empty() {
        return;
    }
    if !verbose {
        let _ = writeln!(out, "\n{} {} device(s) without a loadable driver", "Skipped:".dimmed(), skipped.len());
        return;
    }
    let _ = writeln!(out, "\n{}:", "Skipped devices".dimmed());
    for result in skipped {
        let reason = match &result.outcome {
            LoadOutcome::Skipped {
                reason: SkipReason::PreviouslyFailed { module },
            } => format!("{} failed earlier", module),
            _ => "no matching driver".to_string(),
        };
        let _ = writeln!(out, "  - {} ({}): {}", result.device, result.id, reason);
    }
}

fn format_interface(out: &mut String, interface: &InterfaceRecord, networks: Option<usize>) {
    let kind = match interface.kind {
        InterfaceKind::Ethernet => "ethernet",
        InterfaceKind::Wifi => "wifi",
    };
    let speed = interface.speed.as_deref().map(|s| format!(" ({})", s)).unwrap_or_default();
    let _ = writeln!(
        out,
        "  {} {} {}: {}{}",
        status_marker(interface.status),
        interface.name.cyan(),
        kind,
        status_label(interface.status),
        speed
    );
    if let Some(mac) = &interface.mac {
        let _ = writeln!(out, "      MAC: {}", mac);
    }
    if !interface.addresses.is_empty() {
        let _ = writeln!(out, "      IPs: {}", interface.addresses.join(", "));
    }
    if let Some(ssid) = interface.wireless.as_ref().and_then(|w| w.ssid.as_ref()) {
        let _ = writeln!(out, "      SSID: {}", ssid);
    }
    if let Some(count) = networks {
        let _ = writeln!(out, "      Available networks: {}", count);
    }
}

fn status_label(status: InterfaceStatus) -> &'static str {
    match status {
        InterfaceStatus::Up => "up",
        InterfaceStatus::Down => "down",
        InterfaceStatus::Active => "active",
        InterfaceStatus::Inactive => "inactive",
        InterfaceStatus::NoCarrier => "no carrier",
    }
}

fn status_marker(status: InterfaceStatus) -> ColoredString {
    match status {
        InterfaceStatus::Active | InterfaceStatus::Up => "●".green(),
        InterfaceStatus::NoCarrier | InterfaceStatus::Inactive => "●".yellow(),
        InterfaceStatus::Down => "●".red(),
    }
}

fn format_sync(out: &mut String, file: &FileSyncReport) {
    let path = file.path.display().to_string();
    if let Some(error) = &file.error {
        let _ = writeln!(out, "  {} {}: {}", "!".red(), path.yellow(), error);
        return;
    }
    if file.changes.is_empty() {
        let _ = writeln!(out, "  {} {} already up to date", "OK".green().bold(), path.yellow());
        return;
    }
    let _ = writeln!(out, "  {} {} ({} changes)", "OK".green().bold(), path.yellow(), file.changes.len());
    for change in &file.changes {
        let _ = writeln!(
            out,
            "    {} {}={}",
            action_marker(change.action),
            change.key,
            change.new_value
        );
    }
    if let Some(backup) = &file.backup {
        let _ = writeln!(out, "    {}: {}", "Backup".dimmed(), backup.display());
    }
}

fn action_marker(action: ChangeAction) -> ColoredString {
    match action {
        ChangeAction::Added => "+".green(),
        ChangeAction::Modified => "~".yellow(),
        ChangeAction::Removed => "-".red(),
    }
}

/// Pending configuration changes with colored unified diffs.
pub fn format_previews(previews: &[ConfigPreview]) -> String {
    let mut out = String::new();
    if previews.is_empty() {
        let _ = writeln!(out, "{} No configuration changes needed", "OK".green().bold());
        return out;
    }

    for preview in previews {
        let path = preview.path.display().to_string();
        if let Some(error) = &preview.error {
            let _ = writeln!(out, "{} {}: {}", "!".red(), path.yellow(), error);
            continue;
        }
        if preview.changes.is_empty() {
            let _ = writeln!(out, "{} {} already up to date", "OK".green().bold(), path.yellow());
            continue;
        }
        let _ = writeln!(out, "{} ({} changes):", path.yellow().bold(), preview.changes.len());
        for line in preview.diff.lines() {
            let line = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            let _ = writeln!(out, "  {}", line);
        }
        let _ = writeln!(out);
    }
    out
}
