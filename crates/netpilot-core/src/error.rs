//! Error types for netpilot-core

use std::path::PathBuf;

/// Result type for netpilot-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in netpilot-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: netpilot_fs::Error,
    },

    /// A configuration file could not be replaced; the original is untouched
    #[error("Failed to write {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: netpilot_fs::Error,
    },

    /// An explicitly requested settings file does not exist
    #[error("Settings not found at {path}")]
    SettingsNotFound { path: PathBuf },

    /// The settings file is not valid TOML for [`crate::Settings`]
    #[error("Invalid settings in {path}: {source}")]
    InvalidSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from netpilot-fs
    #[error(transparent)]
    Fs(#[from] netpilot_fs::Error),

    /// Rule table error from netpilot-drivers
    #[error(transparent)]
    Drivers(#[from] netpilot_drivers::Error),

    /// Collaborator error from netpilot-system
    #[error(transparent)]
    System(#[from] netpilot_system::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
