//! Errors raised when decoding orderings and scopes from foreign representations.
//!
//! The atomic operations themselves have no runtime failure mode; these only
//! cover parsing and C ABI conversions at the edge of the crate.

use core::fmt;

/// A memory order could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    /// The C ABI value was outside `0..=5`.
    OutOfRange(i32),
    /// The name is not one of `relaxed`, `consume`, `acquire`, `release`,
    /// `acq_rel` or `seq_cst`.
    UnknownName,
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::OutOfRange(v) => write!(f, "memory order value {v} is outside 0..=5"),
            OrderError::UnknownName => f.write_str("unknown memory order name"),
        }
    }
}

#[cfg(not(target_os = "cuda"))]
impl std::error::Error for OrderError {}

/// A thread scope could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    /// The scope identifier was outside `0..=4`.
    OutOfRange(u32),
    /// The name is not one of `thread`, `block`, `cluster`, `device` or `system`.
    UnknownName,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::OutOfRange(v) => write!(f, "scope identifier {v} is outside 0..=4"),
            ScopeError::UnknownName => f.write_str("unknown scope name"),
        }
    }
}

#[cfg(not(target_os = "cuda"))]
impl std::error::Error for ScopeError {}
