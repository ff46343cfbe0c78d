//! C ABI for the wat object graph.
//!
//! Every record and array type gets the same five entry points
//! (`wat_<type>_new`, `_delete`, `_clone`, `_copy`, `_reassign`) and every
//! array type an `_add`, all generated from one macro in [`lifecycle`].
//! Strings and identifiers have their own ownership functions in
//! [`string`]; event registration and host-side firing live in [`event`];
//! [`log`] routes `tracing` output to a host-provided sink; [`init`] holds
//! `wat_init` / `wat_close`.
//!
//! Pointers handed out are pointers to [`Counted`](wat_heap::Counted)
//! cells: C reads and writes fields directly behind the leading
//! `ref_count`. Fallible functions return a [`WatStatus`](status::WatStatus)
//! as `i32`. No panic crosses the boundary.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `wat-heap`).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, turning a panic into `WatStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(_) => {
                tracing::error!("panic caught at the C boundary");
                $crate::status::WatStatus::Panicked as i32
            }
        }
    };
}

/// Like `ffi_guard!`, for bodies that return a value other than a status.
/// `$fallback` is returned if the body panics.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => {
                tracing::error!("panic caught at the C boundary");
                $fallback
            }
        }
    };
}

pub mod cell;
pub mod event;
pub mod init;
pub mod lifecycle;
pub mod log;
pub mod status;
pub mod string;

pub use init::{wat_close, wat_init, WatInitOptions};
pub use log::{WatLogLevel, WatLogSink};
pub use status::WatStatus;

/// Serializes tests that touch the process-wide registry or log sink.
#[cfg(test)]
pub(crate) fn test_state() -> std::sync::MutexGuard<'static, ()> {
    static STATE: std::sync::Mutex<()> = std::sync::Mutex::new(());
    STATE.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
