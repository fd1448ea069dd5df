//! Error types for netpilot-drivers

/// Result type for netpilot-drivers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in netpilot-drivers operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule violates a structural invariant of the table
    #[error("Invalid driver rule #{index} ({module}): {reason}")]
    InvalidRule {
        index: usize,
        module: String,
        reason: String,
    },

    /// A hardware identifier could not be parsed as hexadecimal
    #[error("Invalid hardware id: {value:?}")]
    InvalidHexId { value: String },
}
