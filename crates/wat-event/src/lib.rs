//! Event callbacks for wat plugins.
//!
//! A [`Registry`] holds at most one callback per event kind. The host
//! raises events through [`Registry::dispatch`] (or the typed helpers in
//! [`host`]): the event record is built only when a callback is present,
//! handed over in a fresh cell, and the host's stake is released as soon
//! as the callback returns.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod host;
pub mod registry;

pub use host::{fire_player_join, fire_sign_change, PlayerJoinOutcome, SignChangeOutcome};
pub use registry::{global, Callback, Event, Registry};
