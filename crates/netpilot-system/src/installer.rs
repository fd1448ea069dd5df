//! Firmware package installation

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::runner::{CommandRunner, CommandSpec};

/// Installs binary packages.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn is_installed(&self, package: &str) -> Result<bool>;
    async fn install(&self, package: &str, timeout: Duration) -> Result<()>;
}

/// [`PackageInstaller`] backed by `pkg`.
#[derive(Debug, Clone)]
pub struct PkgInstaller {
    runner: CommandRunner,
}

impl PkgInstaller {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl PackageInstaller for PkgInstaller {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        let spec = CommandSpec::new("pkg").args(["info", package]);
        let output = self.runner.run_fresh(&spec, self.runner.timeout()).await?;
        Ok(output.success())
    }

    async fn install(&self, package: &str, timeout: Duration) -> Result<()> {
        let spec = CommandSpec::new("pkg").args(["install", "-y", package]);
        self.runner.run_checked(&spec, timeout).await?;
        tracing::info!(package, "Installed firmware package");
        Ok(())
    }
}
