//! [`ConfigFixture`]: scratch system configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding `boot/loader.conf`, `etc/rc.conf` and a
/// backup directory, none of which exist until written.
///
/// # Example
///
/// ```rust
/// use netpilot_test_utils::ConfigFixture;
///
/// let fixture = ConfigFixture::new();
/// fixture.write_loader("kern.vty=vt\n");
/// assert_eq!(fixture.read_loader(), "kern.vty=vt\n");
/// assert!(fixture.backups().is_empty());
/// ```
pub struct ConfigFixture {
    temp_dir: TempDir,
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("boot")).unwrap();
        fs::create_dir_all(temp_dir.path().join("etc")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn loader_conf(&self) -> PathBuf {
        self.root().join("boot/loader.conf")
    }

    pub fn rc_conf(&self) -> PathBuf {
        self.root().join("etc/rc.conf")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root().join("backups")
    }

    pub fn write_loader(&self, content: &str) {
        fs::write(self.loader_conf(), content).unwrap();
    }

    pub fn write_rc(&self, content: &str) {
        fs::write(self.rc_conf(), content).unwrap();
    }

    /// Content of `loader.conf`, empty if it does not exist.
    pub fn read_loader(&self) -> String {
        fs::read_to_string(self.loader_conf()).unwrap_or_default()
    }

    /// Content of `rc.conf`, empty if it does not exist.
    pub fn read_rc(&self) -> String {
        fs::read_to_string(self.rc_conf()).unwrap_or_default()
    }

    /// Files in the backup directory, sorted by name.
    pub fn backups(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.backup_dir()) else {
            return Vec::new();
        };
        let mut backups: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        backups.sort();
        backups
    }

    /// Write a `netpilot.toml` pointing every path into this fixture and
    /// zeroing the delays, then return its path.
    pub fn write_settings(&self) -> PathBuf {
        let path = self.root().join("netpilot.toml");
        let content = format!(
            "backup_dir = {:?}\nloader_conf = {:?}\nrc_conf = {:?}\n\
             interface_probe_delay_secs = 0\nmodule_settle_delay_secs = 0\n",
            self.backup_dir(),
            self.loader_conf(),
            self.rc_conf(),
        );
        fs::write(&path, content).unwrap();
        path
    }
}
