//! Core types for the wat object graph.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! value types shared by every other wat crate: the 16-byte [`Uuid`]
//! identifier, the lifecycle and configuration error types, the process
//! configuration, and the set of event kinds the host can raise.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod id;

pub use config::{ArrayGrowth, ConfigError, WatConfig};
pub use error::LifecycleError;
pub use event::EventKind;
pub use id::{Uuid, UUID_SIZE};
