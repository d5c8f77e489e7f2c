//! Errors surfaced by the line-oriented driver loop.

/// Errors that can terminate the driver loop.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// An I/O error occurred while reading stdin or writing stdout.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
