//! Kernel module loading

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::runner::{CommandRunner, CommandSpec};

/// Loads kernel modules.
///
/// `load` must succeed without side effects when the module is already
/// present.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn is_loaded(&self, module: &str) -> Result<bool>;
    async fn load(&self, module: &str, timeout: Duration) -> Result<()>;
}

/// [`ModuleLoader`] backed by `kldstat` and `kldload`.
#[derive(Debug, Clone)]
pub struct KldLoader {
    runner: CommandRunner,
}

impl KldLoader {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ModuleLoader for KldLoader {
    async fn is_loaded(&self, module: &str) -> Result<bool> {
        let spec = CommandSpec::new("kldstat").args(["-n", module]);
        let output = self.runner.run_fresh(&spec, self.runner.timeout()).await?;
        Ok(output.success() && output.stdout.contains(module))
    }

    async fn load(&self, module: &str, timeout: Duration) -> Result<()> {
        if self.is_loaded(module).await? {
            tracing::debug!(module, "Module already loaded");
            return Ok(());
        }

        let spec = CommandSpec::new("kldload").arg(module);
        self.runner.run_checked(&spec, timeout).await?;
        tracing::info!(module, "Loaded kernel module");
        Ok(())
    }
}
