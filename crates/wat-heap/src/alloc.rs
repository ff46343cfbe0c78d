//! Fallible allocation seam and per-thread allocation accounting.
//!
//! Every heap block owned by the object graph (record cells, array
//! buffers, strings, identifier cells) is obtained through [`allocate`]
//! and returned through [`release`]. Both go straight to the global
//! allocator, so a null return from `malloc` becomes
//! [`LifecycleError::AllocationFailed`] instead of an abort.
//!
//! Counters and failure injection are thread-local: a test observes only
//! the allocations made on its own thread, so tests stay independent
//! under the default parallel test runner.

#![allow(unsafe_code)]

use std::alloc::{self as sys, Layout};
use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use wat_core::LifecycleError;

thread_local! {
    static ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
    static RELEASES: Cell<u64> = const { Cell::new(0) };
    /// Remaining successful allocations before injected failure. `None` = unlimited.
    static BUDGET: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Allocation counters for the current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Blocks handed out by [`allocate`].
    pub allocations: u64,
    /// Blocks returned through [`release`].
    pub releases: u64,
}

impl AllocStats {
    /// Blocks allocated and not yet released.
    pub fn live(&self) -> i64 {
        self.allocations as i64 - self.releases as i64
    }

    /// Counter deltas between `earlier` and `self`.
    pub fn since(&self, earlier: AllocStats) -> AllocStats {
        AllocStats {
            allocations: self.allocations - earlier.allocations,
            releases: self.releases - earlier.releases,
        }
    }
}

/// Snapshot of this thread's allocation counters.
pub fn stats() -> AllocStats {
    AllocStats {
        allocations: ALLOCATIONS.with(Cell::get),
        releases: RELEASES.with(Cell::get),
    }
}

/// Failure injection guard.
///
/// While alive, the next `successes` allocations on this thread succeed
/// and every later one fails with `AllocationFailed`. Dropping the guard
/// restores the previous budget, so guards nest.
#[must_use = "failure injection ends when the guard is dropped"]
pub struct FailAfter {
    previous: Option<u64>,
    _not_send: PhantomData<*const ()>,
}

impl FailAfter {
    /// Allow `successes` more allocations, then fail.
    pub fn new(successes: u64) -> Self {
        let previous = BUDGET.with(|b| b.replace(Some(successes)));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Fail every allocation.
    pub fn now() -> Self {
        Self::new(0)
    }
}

impl Drop for FailAfter {
    fn drop(&mut self) {
        let previous = self.previous;
        let _ = BUDGET.try_with(|b| b.set(previous));
    }
}

fn take_budget() -> bool {
    BUDGET
        .try_with(|b| match b.get() {
            None => true,
            Some(0) => false,
            Some(n) => {
                b.set(Some(n - 1));
                true
            }
        })
        .unwrap_or(true)
}

fn bump(counter: &'static std::thread::LocalKey<Cell<u64>>) {
    let _ = counter.try_with(|c| c.set(c.get() + 1));
}

/// Allocate an uninitialised block for `layout`.
///
/// `layout` must have a non-zero size.
pub(crate) fn allocate(layout: Layout) -> Result<NonNull<u8>, LifecycleError> {
    debug_assert!(layout.size() > 0, "zero-sized allocation");
    if !take_budget() {
        tracing::debug!(bytes = layout.size(), "allocation refused by failure injection");
        return Err(LifecycleError::AllocationFailed {
            bytes: layout.size(),
        });
    }
    // SAFETY: every caller passes a layout with non-zero size.
    let ptr = unsafe { sys::alloc(layout) };
    match NonNull::new(ptr) {
        Some(block) => {
            bump(&ALLOCATIONS);
            Ok(block)
        }
        None => {
            tracing::warn!(bytes = layout.size(), "heap allocation failed");
            Err(LifecycleError::AllocationFailed {
                bytes: layout.size(),
            })
        }
    }
}

/// Return a block obtained from [`allocate`].
///
/// # Safety
///
/// `block` must come from [`allocate`] with exactly this `layout`, and must
/// not be used afterwards.
pub(crate) unsafe fn release(block: NonNull<u8>, layout: Layout) {
    sys::dealloc(block.as_ptr(), layout);
    bump(&RELEASES);
}
