//! Configuration file synchronization
//!
//! Brings `key="value"` files such as `/boot/loader.conf` and
//! `/etc/rc.conf` in line with a set of desired entries while leaving
//! every unrelated line untouched. Changed keys are rewritten in place,
//! new keys are appended under a timestamped NetPilot header, and every
//! applied change lands in the engine's journal.

mod clock;
mod engine;
mod entry;
mod parse;
mod plan;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{SyncEngine, SyncResult};
pub use entry::{ChangeAction, ChangeRecord, ChangeSummary, ConfigEntry};
pub use parse::{format_assignment, parse_assignment, parse_assignments};
pub use plan::{PlannedChange, SECTION_HEADER, SyncPlan};
