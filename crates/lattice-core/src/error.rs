//! Error types for the lattice point and set operations.

/// Errors that can occur while labeling a lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LatticeError {
    /// The point is already decided in the opposite direction.
    #[error("point already decided the other way")]
    AlreadyDecidedOtherWay,
    /// A point with a different dimension was passed to an operation
    /// bound to a fixed N.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The dimension the operation is bound to.
        expected: usize,
        /// The dimension of the offending point.
        found: usize,
    },
}
