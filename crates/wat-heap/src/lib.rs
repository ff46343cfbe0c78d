//! Fallible, reference-counted storage for the wat object graph.
//!
//! Every composite value the host and plugins exchange lives in a heap
//! cell with C layout. This crate provides the cell types and the
//! lifecycle protocol over them. It is one of two crates that may contain
//! `unsafe` code (along with `wat-ffi`); each module that needs it opts in
//! explicitly.
//!
//! # Architecture
//!
//! ```text
//! Shared<T>      ──> Counted<T> { ref_count, value }   (records, arrays)
//! Owned<T>       ──> T                                 (identifiers)
//! WatString      ──> [len header] text \0              (strings)
//! Array<E>       { length, alloc, array: *mut E }      (inside a Shared)
//! ```
//!
//! All blocks come from [`alloc`], which turns allocator failure into
//! [`LifecycleError::AllocationFailed`](wat_core::LifecycleError) and keeps
//! per-thread counters for leak assertions.
//!
//! # Operations
//!
//! The [`lifecycle`] module holds the nullable forms of delete, clone,
//! deep copy, reassign and append that the boundary exports per type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod array;
pub mod copy;
pub mod lifecycle;
pub mod owned;
pub mod shared;
pub mod string;

pub use alloc::{stats, AllocStats, FailAfter};
pub use array::{AppendMode, Array, Element, SharedArray};
pub use copy::DeepCopy;
pub use owned::Owned;
pub use shared::{Counted, Shared};
pub use string::WatString;

/// Everything a record definition needs in scope.
pub mod prelude {
    pub use crate::array::{AppendMode, Array, Element, SharedArray};
    pub use crate::copy::DeepCopy;
    pub use crate::owned::Owned;
    pub use crate::shared::{Counted, Shared};
    pub use crate::string::WatString;
    pub use wat_core::{LifecycleError, Uuid};
}
