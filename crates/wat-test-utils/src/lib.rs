//! Test fixtures and leak checks for wat development.
//!
//! Fixtures build populated object graphs (see [`fixtures`]). The leak
//! helpers wrap the per-thread allocation counters of
//! [`wat_heap::alloc`], so a test can assert that a scenario released
//! every block it allocated.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{chunk, entity, player, strings, uuid, TestWorldBuilder};

use wat_heap::alloc::{stats, AllocStats};

/// Run `scenario` and panic if it leaves blocks allocated on this thread.
///
/// Returns the scenario's result, which must not itself own wat storage
/// (use [`leak_check_stats`] when it does).
pub fn leak_check<R>(scenario: impl FnOnce() -> R) -> R {
    let before = stats();
    let result = scenario();
    let delta = stats().since(before);
    assert_eq!(
        delta.live(),
        0,
        "scenario leaked {} block(s): {} allocated, {} released",
        delta.live(),
        delta.allocations,
        delta.releases
    );
    result
}

/// Run `scenario` and return the allocation counters it moved.
pub fn leak_check_stats(scenario: impl FnOnce()) -> AllocStats {
    let before = stats();
    scenario();
    stats().since(before)
}
