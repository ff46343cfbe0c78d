//! Error types for the lifecycle protocol.
//!
//! Three outcomes are kept distinct: usage errors (the caller broke the
//! contract), allocation failures (the heap said no, partial work has been
//! rolled back), and benign null input, which is not an error at all and
//! surfaces as `Ok(None)` from the operations that accept it.

use std::error::Error;
use std::fmt;

/// Errors from `delete` / `clone` / `deep_copy` / `reassign` / `append`
/// and the record constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    /// A required argument or output slot was null (`WAT_ERROR_INVALID_ARGUMENT`).
    NullArgument {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// An append mode other than share (0) or isolate (1).
    InvalidMode {
        /// The raw mode value received.
        value: i32,
    },
    /// Text contained an interior NUL and cannot cross the boundary.
    InvalidText {
        /// Byte offset of the first NUL.
        nul_position: usize,
    },
    /// An array would grow past the `i32` length the C layout can express.
    CapacityOverflow {
        /// The capacity that was requested.
        requested: usize,
    },
    /// An array header read back with `length` outside `0..=capacity`,
    /// typically after foreign code wrote to it directly.
    CorruptContainer {
        /// The stored length.
        length: i32,
        /// The stored capacity.
        capacity: i32,
    },
    /// The allocator returned no memory (`WAT_ERROR_ALLOCATION_FAILED`).
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
}

impl LifecycleError {
    /// `true` for errors caused by the caller rather than the heap.
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, Self::AllocationFailed { .. })
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullArgument { name } => write!(f, "required argument '{name}' is null"),
            Self::InvalidMode { value } => {
                write!(f, "append mode {value} is neither share (0) nor isolate (1)")
            }
            Self::InvalidText { nul_position } => {
                write!(f, "text contains an interior NUL at byte {nul_position}")
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "array capacity {requested} exceeds i32::MAX")
            }
            Self::CorruptContainer { length, capacity } => {
                write!(f, "array length {length} is outside 0..={capacity}")
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for LifecycleError {}
