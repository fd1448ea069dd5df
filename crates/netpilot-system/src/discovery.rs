//! Hardware and interface discovery

use std::time::Duration;

use async_trait::async_trait;

use netpilot_drivers::HardwareDescriptor;

use crate::interface::{InterfaceRecord, WirelessNetwork};
use crate::parse::{parse_ifconfig, parse_netstat, parse_pciconf, parse_scan, parse_usbconfig};
use crate::runner::{CommandRunner, CommandSpec, DEFAULT_MAX_WORKERS};
use crate::Result;

/// Source of hardware descriptors and interface state, plus the handful
/// of interface actions the run pipeline performs.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn pci_devices(&self) -> Result<Vec<HardwareDescriptor>>;
    async fn usb_devices(&self) -> Result<Vec<HardwareDescriptor>>;
    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>>;
    async fn scan_wireless(&self, interface: &str) -> Result<Vec<WirelessNetwork>>;
    async fn configure_dhcp(&self, interface: &str) -> Result<()>;
    async fn create_wlan(&self, parent: &str, wlan: &str) -> Result<()>;
    /// Let the system attach drivers it already knows about.
    async fn run_devmatch(&self);
    async fn os_release(&self) -> String;
}

/// [`Discovery`] backed by the FreeBSD base system tools.
#[derive(Debug, Clone)]
pub struct SystemDiscovery {
    runner: CommandRunner,
    max_workers: usize,
}

impl SystemDiscovery {
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    async fn stdout(&self, spec: CommandSpec) -> Result<String> {
        Ok(self.runner.run(&spec).await?.stdout)
    }
}

#[async_trait]
impl Discovery for SystemDiscovery {
    async fn pci_devices(&self) -> Result<Vec<HardwareDescriptor>> {
        let output = self.stdout(CommandSpec::new("pciconf").arg("-lv")).await?;
        Ok(parse_pciconf(&output))
    }

    async fn usb_devices(&self) -> Result<Vec<HardwareDescriptor>> {
        let output = self.stdout(CommandSpec::new("usbconfig").arg("dump_all_desc")).await?;
        Ok(parse_usbconfig(&output))
    }

    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>> {
        let listing = self.stdout(CommandSpec::new("ifconfig").arg("-l")).await?;
        let names: Vec<String> = listing
            .split_whitespace()
            .filter(|name| !name.starts_with("lo"))
            .map(str::to_string)
            .collect();

        let queries = names.iter().map(|name| CommandSpec::new("ifconfig").arg(name)).collect();
        let outputs = self.runner.run_parallel(queries, self.max_workers).await;

        let mut records: Vec<InterfaceRecord> = names
            .iter()
            .zip(outputs)
            .filter_map(|(name, output)| match output {
                Ok(output) if output.success() => parse_ifconfig(name, &output.stdout),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(interface = %name, error = %e, "Interface query failed");
                    None
                }
            })
            .collect();

        let stats_queries = records
            .iter()
            .map(|r| CommandSpec::new("netstat").args(["-I", r.name.as_str(), "-b"]))
            .collect();
        let stats = self.runner.run_parallel(stats_queries, self.max_workers).await;
        for (record, output) in records.iter_mut().zip(stats) {
            record.statistics = output
                .ok()
                .filter(|o| o.success())
                .and_then(|o| parse_netstat(&o.stdout));
        }

        tracing::debug!(count = records.len(), "Discovered interfaces");
        Ok(records)
    }

    async fn scan_wireless(&self, interface: &str) -> Result<Vec<WirelessNetwork>> {
        let spec = CommandSpec::new("ifconfig").args([interface, "scan"]);
        let output = self.runner.run_checked(&spec, self.runner.timeout()).await?;
        Ok(parse_scan(&output.stdout))
    }

    async fn configure_dhcp(&self, interface: &str) -> Result<()> {
        let timeout = self.runner.timeout();
        self.runner
            .run_checked(&CommandSpec::new("ifconfig").args([interface, "up"]), timeout)
            .await?;
        self.runner
            .run_checked(&CommandSpec::new("dhclient").arg(interface), timeout)
            .await?;
        tracing::info!(interface, "Configured interface for DHCP");
        Ok(())
    }

    async fn create_wlan(&self, parent: &str, wlan: &str) -> Result<()> {
        let spec = CommandSpec::new("ifconfig").args([wlan, "create", "wlandev", parent]);
        self.runner.run_checked(&spec, self.runner.timeout()).await?;
        tracing::info!(wlan, parent, "Created wlan interface");
        Ok(())
    }

    async fn run_devmatch(&self) {
        let timeout = Duration::from_secs(30).min(self.runner.timeout());
        for spec in [
            CommandSpec::new("devmatch").arg("-p"),
            CommandSpec::new("/etc/rc.d/devmatch").arg("onestart"),
        ] {
            if let Err(e) = self.runner.run_fresh(&spec, timeout).await {
                tracing::debug!(command = %spec, error = %e, "devmatch step failed");
            }
        }
    }

    async fn os_release(&self) -> String {
        match self.stdout(CommandSpec::new("uname").arg("-r")).await {
            Ok(release) if !release.trim().is_empty() => release.trim().to_string(),
            _ => "unknown".to_string(),
        }
    }
}
