//! Core engines for NetPilot
//!
//! - [`Orchestrator`]: matches devices to driver rules and loads modules,
//!   prerequisites and firmware through the system collaborators
//! - [`SyncEngine`]: rewrites `key="value"` configuration files in place,
//!   with backups, atomic replacement and a change journal
//! - [`entries`]: the `loader.conf` and `rc.conf` entries a run wants
//! - [`Pipeline`]: one complete run from discovery to configuration
//! - [`Settings`]: `netpilot.toml`

pub mod entries;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod settings;
pub mod state;
pub mod sync;

pub use entries::{BOOT_DRIVERS, loader_entries, rc_entries};
pub use error::{Error, Result};
pub use orchestrator::{
    BatchReport, DeviceResult, FirmwareOutcome, LoadOptions, LoadOutcome, ModuleConflict, Orchestrator, SkipReason,
};
pub use pipeline::{
    ConfigPreview, DhcpResult, DiscoveryInfo, FileSyncReport, Pipeline, RunOptions, RunReport, Statistics,
};
pub use settings::{DEFAULT_SETTINGS_PATH, Settings};
pub use state::LoadState;
pub use sync::{
    ChangeAction, ChangeRecord, ChangeSummary, Clock, ConfigEntry, FixedClock, PlannedChange, SyncEngine, SyncPlan,
    SyncResult, SystemClock,
};
