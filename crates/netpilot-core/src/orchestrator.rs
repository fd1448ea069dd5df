//! Driver load orchestration
//!
//! Turns matched rules into loaded kernel modules: prerequisites first,
//! then the driver itself, then its firmware package. Every step goes
//! through the [`ModuleLoader`] and [`PackageInstaller`] collaborators,
//! and every outcome is recorded in a caller-owned [`LoadState`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use netpilot_drivers::{DeviceKind, FirmwarePlan, HardwareDescriptor, RuleDatabase, plan_firmware};
use netpilot_system::{ModuleLoader, PackageInstaller};

use crate::state::LoadState;

/// Timeouts and delays applied while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub load_timeout: Duration,
    pub firmware_timeout: Duration,
    /// Pause after each successful load so the driver can attach
    pub settle_delay: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            firmware_timeout: Duration::from_secs(120),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// How the firmware step for a loaded driver ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FirmwareOutcome {
    Installed { package: String },
    AlreadyInstalled { package: String },
    /// The device-specific package failed and the generic one was installed
    FallbackInstalled { package: String },
    /// Neither tier could be installed; the driver stays loaded
    Failed { specific: String, generic: String, cause: String },
}

impl FirmwareOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Why a device was not handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// No rule accepts the device
    NoRule,
    /// The matched module already failed earlier in this run
    PreviouslyFailed { module: String },
}

/// Result of resolving and loading one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded {
        module: String,
        firmware: Option<FirmwareOutcome>,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        module: String,
        cause: String,
    },
}

impl LoadOutcome {
    /// Module that ended up loaded, if any.
    pub fn loaded_module(&self) -> Option<&str> {
        match self {
            Self::Loaded { module, .. } => Some(module),
            _ => None,
        }
    }
}

/// Outcome for one device of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceResult {
    pub device: String,
    pub id: String,
    pub kind: DeviceKind,
    pub outcome: LoadOutcome,
}

/// Two loaded modules whose rules declare each other incompatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleConflict {
    pub module: String,
    pub conflicts_with: String,
}

/// Outcomes of a whole batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub results: Vec<DeviceResult>,
    pub conflicts: Vec<ModuleConflict>,
}

impl BatchReport {
    /// Distinct modules loaded by this batch, in load order.
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = Vec::new();
        for module in self.results.iter().filter_map(|r| r.outcome.loaded_module()) {
            if !modules.iter().any(|m| m == module) {
                modules.push(module.to_string());
            }
        }
        modules
    }

    pub fn loaded(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Loaded { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Skipped { .. }))
    }

    /// Firmware outcomes paired with the module they belong to.
    pub fn firmware(&self) -> impl Iterator<Item = (&str, &FirmwareOutcome)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            LoadOutcome::Loaded {
                module,
                firmware: Some(firmware),
            } => Some((module.as_str(), firmware)),
            _ => None,
        })
    }
}

/// Resolves devices to drivers and loads them.
#[derive(Clone)]
pub struct Orchestrator {
    db: Arc<RuleDatabase>,
    loader: Arc<dyn ModuleLoader>,
    installer: Arc<dyn PackageInstaller>,
    options: LoadOptions,
}

impl Orchestrator {
    pub fn new(db: Arc<RuleDatabase>, loader: Arc<dyn ModuleLoader>, installer: Arc<dyn PackageInstaller>) -> Self {
        Self {
            db,
            loader,
            installer,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn database(&self) -> &RuleDatabase {
        &self.db
    }

    /// Match `descriptor`, load its prerequisites and driver, then its firmware.
    ///
    /// Never fails: every problem is reported in the returned outcome and
    /// recorded in `state`. Prerequisite failures are logged and do not
    /// stop the primary module from being attempted. A firmware failure
    /// leaves the driver counted as loaded.
    pub async fn resolve_and_load(&self, descriptor: &HardwareDescriptor, state: &mut LoadState) -> LoadOutcome {
        let Some(rule) = self.db.match_device(descriptor) else {
            return LoadOutcome::Skipped {
                reason: SkipReason::NoRule,
            };
        };

        if state.has_failed(&rule.module) {
            tracing::debug!(module = %rule.module, "Skipping module that already failed");
            return LoadOutcome::Skipped {
                reason: SkipReason::PreviouslyFailed {
                    module: rule.module.clone(),
                },
            };
        }

        for dependency in self.db.dependencies(rule) {
            if let Err(cause) = self.load_module(dependency, state).await {
                tracing::warn!(
                    dependency = %dependency,
                    module = %rule.module,
                    error = %cause,
                    "Failed to load prerequisite"
                );
            }
        }

        if let Err(cause) = self.load_module(&rule.module, state).await {
            tracing::warn!(module = %rule.module, device = %descriptor.id_pair(), error = %cause, "Failed to load driver");
            return LoadOutcome::Failed {
                module: rule.module.clone(),
                cause: cause.to_string(),
            };
        }

        let firmware = match plan_firmware(descriptor, rule) {
            Some(plan) => Some(self.install_firmware(&plan).await),
            None => None,
        };

        LoadOutcome::Loaded {
            module: rule.module.clone(),
            firmware,
        }
    }

    /// Resolve every descriptor, wired hardware before wireless.
    ///
    /// Discovery order is kept within each group. A device is grouped by
    /// the kind of the rule it matches, or by its own kind when nothing
    /// matches.
    pub async fn resolve_batch(&self, descriptors: &[HardwareDescriptor], state: &mut LoadState) -> BatchReport {
        let (wired, wireless): (Vec<&HardwareDescriptor>, Vec<&HardwareDescriptor>) =
            descriptors.iter().partition(|d| !self.effective_kind(d).is_wireless());

        let mut report = BatchReport::default();
        for descriptor in wired.into_iter().chain(wireless) {
            let outcome = self.resolve_and_load(descriptor, state).await;
            report.results.push(DeviceResult {
                device: descriptor.label(),
                id: descriptor.id_pair(),
                kind: self.effective_kind(descriptor),
                outcome,
            });
        }

        report.conflicts = self.conflicts(&report, state);
        for conflict in &report.conflicts {
            tracing::warn!(module = %conflict.module, conflicts_with = %conflict.conflicts_with, "Conflicting modules loaded");
        }

        tracing::info!(
            loaded = report.loaded().count(),
            failed = report.failed().count(),
            skipped = report.skipped().count(),
            "Driver batch complete"
        );
        report
    }

    /// Forget the failures of `modules` and run the batch again.
    pub async fn retry_failed<S: AsRef<str>>(
        &self,
        descriptors: &[HardwareDescriptor],
        state: &mut LoadState,
        modules: &[S],
    ) -> BatchReport {
        state.clear_failed(modules);
        tracing::info!(modules = modules.len(), "Retrying failed modules");
        self.resolve_batch(descriptors, state).await
    }

    fn effective_kind(&self, descriptor: &HardwareDescriptor) -> DeviceKind {
        self.db
            .match_device(descriptor)
            .map(|rule| rule.kind)
            .unwrap_or(descriptor.kind)
    }

    fn conflicts(&self, report: &BatchReport, state: &LoadState) -> Vec<ModuleConflict> {
        let mut found = Vec::new();
        for module in report.loaded_modules() {
            let Some(rule) = self.db.rules().iter().find(|r| r.module == module) else {
                continue;
            };
            for other in rule.conflicts.iter().filter(|other| state.is_loaded(other)) {
                found.push(ModuleConflict {
                    module: module.clone(),
                    conflicts_with: other.clone(),
                });
            }
        }
        found
    }

    async fn load_module(&self, module: &str, state: &mut LoadState) -> netpilot_system::Result<()> {
        if state.is_loaded(module) {
            return Ok(());
        }

        match self.loader.is_loaded(module).await {
            Ok(true) => {
                tracing::debug!(module, "Module already present");
                state.mark_loaded(module);
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(module, error = %e, "Could not query module state"),
        }

        match self.loader.load(module, self.options.load_timeout).await {
            Ok(()) => {
                tracing::info!(module, "Loaded module");
                state.mark_loaded(module);
                if !self.options.settle_delay.is_zero() {
                    tokio::time::sleep(self.options.settle_delay).await;
                }
                Ok(())
            }
            Err(e) => {
                state.mark_failed(module);
                Err(e)
            }
        }
    }

    async fn install_firmware(&self, plan: &FirmwarePlan) -> FirmwareOutcome {
        let cause = match self.install_package(&plan.specific).await {
            Ok(true) => {
                return FirmwareOutcome::Installed {
                    package: plan.specific.clone(),
                };
            }
            Ok(false) => {
                return FirmwareOutcome::AlreadyInstalled {
                    package: plan.specific.clone(),
                };
            }
            Err(e) => e,
        };

        if !plan.has_fallback() {
            tracing::warn!(package = %plan.specific, error = %cause, "Firmware install failed");
            return FirmwareOutcome::Failed {
                specific: plan.specific.clone(),
                generic: plan.generic.clone(),
                cause: cause.to_string(),
            };
        }

        tracing::warn!(
            package = %plan.specific,
            fallback = %plan.generic,
            error = %cause,
            "Device firmware install failed, trying generic package"
        );
        match self.install_package(&plan.generic).await {
            Ok(_) => FirmwareOutcome::FallbackInstalled {
                package: plan.generic.clone(),
            },
            Err(e) => {
                tracing::warn!(package = %plan.generic, error = %e, "Generic firmware install failed");
                FirmwareOutcome::Failed {
                    specific: plan.specific.clone(),
                    generic: plan.generic.clone(),
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Install `package` unless present. `Ok(true)` when it was installed now.
    async fn install_package(&self, package: &str) -> netpilot_system::Result<bool> {
        match self.installer.is_installed(package).await {
            Ok(true) => {
                tracing::debug!(package, "Firmware already installed");
                return Ok(false);
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(package, error = %e, "Could not query package state"),
        }

        self.installer.install(package, self.options.firmware_timeout).await?;
        tracing::info!(package, "Installed firmware");
        Ok(true)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("rules", &self.db.len())
            .field("options", &self.options)
            .finish()
    }
}
