//! Settings parsing for netpilot.toml
//!
//! Every field is optional in the file; missing fields take the built-in
//! defaults. Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use netpilot_fs::io::read_text_if_exists;

use crate::orchestrator::LoadOptions;
use crate::{Error, Result};

/// Location consulted when no settings file is given explicitly.
pub const DEFAULT_SETTINGS_PATH: &str = "/usr/local/etc/netpilot.toml";

fn default_backup_dir() -> PathBuf {
    PathBuf::from("/var/backups/netpilot")
}

fn default_loader_conf() -> PathBuf {
    PathBuf::from("/boot/loader.conf")
}

fn default_rc_conf() -> PathBuf {
    PathBuf::from("/etc/rc.conf")
}

fn default_driver_load_timeout() -> u64 {
    10
}

fn default_firmware_install_timeout() -> u64 {
    120
}

fn default_command_timeout() -> u64 {
    30
}

fn default_probe_delay() -> u64 {
    2
}

fn default_settle_delay() -> u64 {
    1
}

fn default_max_workers() -> usize {
    4
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory receiving timestamped copies of modified files
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    #[serde(default = "default_loader_conf")]
    pub loader_conf: PathBuf,

    #[serde(default = "default_rc_conf")]
    pub rc_conf: PathBuf,

    #[serde(default = "default_driver_load_timeout")]
    pub driver_load_timeout_secs: u64,

    #[serde(default = "default_firmware_install_timeout")]
    pub firmware_install_timeout_secs: u64,

    /// Bound for discovery and interface commands
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Wait between loading drivers and enumerating interfaces
    #[serde(default = "default_probe_delay")]
    pub interface_probe_delay_secs: u64,

    /// Wait after each successful module load
    #[serde(default = "default_settle_delay")]
    pub module_settle_delay_secs: u64,

    /// Concurrent per-interface queries
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            loader_conf: default_loader_conf(),
            rc_conf: default_rc_conf(),
            driver_load_timeout_secs: default_driver_load_timeout(),
            firmware_install_timeout_secs: default_firmware_install_timeout(),
            command_timeout_secs: default_command_timeout(),
            interface_probe_delay_secs: default_probe_delay(),
            module_settle_delay_secs: default_settle_delay(),
            max_workers: default_max_workers(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use netpilot_core::Settings;
    ///
    /// let settings = Settings::parse(r#"
    /// backup_dir = "/tmp/netpilot-backups"
    /// max_workers = 8
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.max_workers, 8);
    /// assert_eq!(settings.driver_load_timeout_secs, 10);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Load settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsNotFound`] if the file does not exist and
    /// [`Error::InvalidSettings`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_text_if_exists(path)?.ok_or_else(|| Error::SettingsNotFound {
            path: path.to_path_buf(),
        })?;
        toml::from_str(&content).map_err(|source| Error::InvalidSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else the default location if it exists,
    /// else the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = Path::new(DEFAULT_SETTINGS_PATH);
        if default_path.exists() {
            tracing::debug!(path = %default_path.display(), "Loading settings");
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_secs(self.interface_probe_delay_secs)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            load_timeout: Duration::from_secs(self.driver_load_timeout_secs),
            firmware_timeout: Duration::from_secs(self.firmware_install_timeout_secs),
            settle_delay: Duration::from_secs(self.module_settle_delay_secs),
        }
    }
}
