//! C-compatible status codes.
//!
//! [`WatStatus`] is a `repr(i32)` enum covering every failure a wat entry
//! point can report. Conversions from [`LifecycleError`] and
//! [`ConfigError`] are provided.

use wat_core::{ConfigError, LifecycleError};

/// C-compatible status code returned by fallible FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatStatus {
    /// Success.
    Ok = 0,
    /// A required pointer is null or an argument is otherwise invalid.
    InvalidArgument = -1,
    /// An append mode other than `WAT_CLONE` / `WAT_COPY`.
    InvalidMode = -2,
    /// Text contains an interior NUL or is not valid UTF-8.
    InvalidText = -3,
    /// A container would exceed its maximum capacity.
    CapacityOverflow = -4,
    /// A container header violates `0 <= length <= alloc`.
    CorruptContainer = -5,
    /// The allocator returned null. Partial work was rolled back.
    AllocationFailed = -6,
    /// Configuration validation error.
    ConfigError = -7,
    /// `wat_init` already ran with a different configuration.
    AlreadyInitialized = -8,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -9,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl WatStatus {
    /// Status for a `Result`.
    pub fn from_result<T>(result: &Result<T, LifecycleError>) -> Self {
        match result {
            Ok(_) => WatStatus::Ok,
            Err(e) => WatStatus::from(e),
        }
    }
}

impl From<&LifecycleError> for WatStatus {
    fn from(e: &LifecycleError) -> Self {
        match e {
            LifecycleError::NullArgument { .. } => WatStatus::InvalidArgument,
            LifecycleError::InvalidMode { .. } => WatStatus::InvalidMode,
            LifecycleError::InvalidText { .. } => WatStatus::InvalidText,
            LifecycleError::CapacityOverflow { .. } => WatStatus::CapacityOverflow,
            LifecycleError::CorruptContainer { .. } => WatStatus::CorruptContainer,
            LifecycleError::AllocationFailed { .. } => WatStatus::AllocationFailed,
        }
    }
}

impl From<&ConfigError> for WatStatus {
    fn from(e: &ConfigError) -> Self {
        match e {
            ConfigError::AlreadyInstalled => WatStatus::AlreadyInitialized,
            _ => WatStatus::ConfigError,
        }
    }
}
