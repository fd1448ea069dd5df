//! System collaborators for NetPilot
//!
//! Everything that touches the running system lives here, behind traits
//! so the engines in `netpilot-core` can be driven by fakes in tests:
//!
//! - [`CommandRunner`]: argv execution with timeouts, an optional result
//!   cache and a bounded parallel pool
//! - [`ModuleLoader`] / [`KldLoader`]: `kldstat` and `kldload`
//! - [`PackageInstaller`] / [`PkgInstaller`]: `pkg info` and `pkg install`
//! - [`Discovery`] / [`SystemDiscovery`]: `pciconf`, `usbconfig`,
//!   `ifconfig` and `netstat`, parsed by the pure functions in [`parse`]

pub mod discovery;
pub mod error;
pub mod installer;
pub mod interface;
pub mod loader;
pub mod parse;
pub mod runner;

pub use discovery::{Discovery, SystemDiscovery};
pub use error::{Error, Result};
pub use installer::{PackageInstaller, PkgInstaller};
pub use interface::{
    InterfaceKind, InterfaceRecord, InterfaceStatistics, InterfaceStatus, WirelessInfo, WirelessNetwork,
};
pub use loader::{KldLoader, ModuleLoader};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_WORKERS};
