//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

use netpilot_core::RunOptions;

/// NetPilot - network hardware discovery and driver setup for FreeBSD
///
/// Without options, discovers network hardware, loads matching drivers
/// and firmware, and reports the interfaces that came up.
///
/// Examples:
///   netpilot                                  # Discover and load drivers
///   netpilot --no-driver-loading --json       # Inventory only, as JSON
///   netpilot --configure-boot --yes           # Persist drivers to loader.conf
///   netpilot --configure-dhcp --interface em0 # Run DHCP on em0 now
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "netpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// List the hardware the built-in driver database supports and exit
    #[arg(long)]
    pub show_coverage: bool,

    /// Configure interfaces for DHCP (in rc.conf with --configure-startup)
    #[arg(long)]
    pub configure_dhcp: bool,

    /// Scan for wireless networks on WiFi interfaces
    #[arg(long)]
    pub scan_wifi: bool,

    /// Restrict DHCP configuration to one interface
    #[arg(long, value_name = "IF")]
    pub interface: Option<String>,

    /// Discover hardware without loading any driver
    #[arg(long)]
    pub no_driver_loading: bool,

    /// Retry modules that failed to load during this run
    #[arg(long)]
    pub retry_failed: bool,

    /// Persist loaded drivers to loader.conf
    #[arg(long)]
    pub configure_boot: bool,

    /// Persist interface startup to rc.conf
    #[arg(long)]
    pub configure_startup: bool,

    /// Create wlan interfaces for WiFi devices
    #[arg(long)]
    pub create_wlan: bool,

    /// Show the configuration file changes a run would make, without writing
    #[arg(long)]
    pub show_config_changes: bool,

    /// Directory for configuration backups
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Settings file
    #[arg(long, value_name = "FILE", env = "NETPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write configuration files without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl Cli {
    /// Pipeline options selected by the flags.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            load_drivers: !self.no_driver_loading,
            retry_failed: self.retry_failed,
            configure_boot: self.configure_boot && !self.show_config_changes,
            configure_startup: self.configure_startup && !self.show_config_changes,
            dhcp: self.configure_dhcp,
            create_wlan: self.create_wlan,
            scan_wifi: self.scan_wifi,
            interface: self.interface.clone(),
            preview_config: self.show_config_changes,
        }
    }

    /// Default log filter for the verbosity flags, `None` to defer to `RUST_LOG`.
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}
