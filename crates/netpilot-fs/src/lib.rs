//! Filesystem primitives for NetPilot
//!
//! Provides atomic replacement of configuration files and timestamped
//! backup copies. Everything that touches `/boot/loader.conf` or
//! `/etc/rc.conf` goes through this crate.

pub mod backup;
pub mod error;
pub mod io;

pub use backup::{BACKUP_EXTENSION, backup_file_name, create_backup};
pub use error::{Error, Result};
