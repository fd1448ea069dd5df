//! Driver resolution data and lookups for NetPilot
//!
//! This crate holds the static knowledge NetPilot has about network
//! hardware:
//!
//! - **Rule database**: ordered driver rules plus a module blacklist,
//!   validated once at construction
//! - **Matcher**: picks the single best rule for a hardware descriptor
//! - **Firmware resolver**: refines a rule's generic firmware package to
//!   a device-specific one
//! - **Coverage**: groups the table by hardware category for reporting
//!
//! Nothing here performs I/O. Loading modules and installing packages
//! happens in `netpilot-core` through the collaborators defined in
//! `netpilot-system`.

pub mod builtins;
pub mod coverage;
pub mod database;
pub mod descriptor;
pub mod error;
pub mod firmware;
pub mod matcher;
pub mod rule;
pub mod validation;

pub use coverage::CoverageSummary;
pub use database::RuleDatabase;
pub use descriptor::{BusKind, ClassCode, DeviceKind, HardwareDescriptor, parse_hex_id};
pub use error::{Error, Result};
pub use firmware::{FirmwarePlan, plan_firmware, resolve_firmware};
pub use matcher::{candidates, match_device};
pub use rule::DriverRule;
