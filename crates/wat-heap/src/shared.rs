//! [`Shared<T>`]: the reference-counted handle every composite lives behind.
//!
//! The heap cell is a `#[repr(C)]` [`Counted<T>`] with the count first, so a
//! C caller holding `*mut Counted<T>` sees the familiar
//! `{ int ref_count; <fields> }` layout and can read fields directly.
//!
//! - `clone` increments the count and returns the same cell.
//! - `drop` decrements it; the last drop releases every owned child (by
//!   dropping `T`) and then the cell itself.
//! - [`DeepCopy`] allocates a brand-new cell holding a deep copy of `T`.
//!
//! Counts are atomic, so clones may be created and dropped from any thread.
//!
//! # Shared mutation
//!
//! Holders of the same cell see each other's writes. Safe Rust only hands
//! out `&mut T` through [`Shared::get_mut`] when the count is 1. Mutating a
//! shared cell goes through [`Shared::get_mut_unchecked`], which is what the
//! C boundary does implicitly with every direct field write.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicI32, Ordering};

use wat_core::LifecycleError;

use crate::alloc;
use crate::copy::DeepCopy;

/// Heap cell behind a [`Shared<T>`]: reference count followed by the value.
#[repr(C)]
pub struct Counted<T> {
    ref_count: AtomicI32,
    value: T,
}

impl<T> Counted<T> {
    /// Current reference count.
    pub fn ref_count(&self) -> i32 {
        self.ref_count.load(Ordering::Acquire)
    }

    /// The stored value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A non-null, reference-counted handle to a heap-allocated `T`.
///
/// `Option<Shared<T>>` is pointer-sized and null when `None`, so it is the
/// field type of every "owned reference, possibly null" in a record.
#[repr(transparent)]
pub struct Shared<T> {
    cell: NonNull<Counted<T>>,
    _owns: PhantomData<Counted<T>>,
}

// SAFETY: the count is atomic, so handles may move between threads when
// the payload itself is thread-safe (the same bounds as `Arc`).
unsafe impl<T: Send + Sync> Send for Shared<T> {}
// SAFETY: as above.
unsafe impl<T: Send + Sync> Sync for Shared<T> {}

const _: () = assert!(std::mem::size_of::<Option<Shared<u8>>>() == std::mem::size_of::<usize>());

impl<T> Shared<T> {
    /// Allocate a new cell holding `value` with `ref_count == 1`.
    ///
    /// On allocation failure `value` is dropped, releasing anything it owned.
    pub fn try_new(value: T) -> Result<Self, LifecycleError> {
        let layout = Layout::new::<Counted<T>>();
        let cell = alloc::allocate(layout)?.cast::<Counted<T>>();
        // SAFETY: `cell` is a fresh, uninitialised block sized for `Counted<T>`.
        unsafe {
            cell.as_ptr().write(Counted {
                ref_count: AtomicI32::new(1),
                value,
            });
        }
        Ok(Self {
            cell,
            _owns: PhantomData,
        })
    }

    fn counted(&self) -> &Counted<T> {
        // SAFETY: the cell stays allocated while any handle exists.
        unsafe { self.cell.as_ref() }
    }

    /// Current reference count.
    pub fn ref_count(&self) -> i32 {
        self.counted().ref_count()
    }

    /// `true` if both handles point at the same cell.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.cell == b.cell
    }

    /// Raw pointer to the cell, without affecting the count.
    pub fn as_ptr(&self) -> *mut Counted<T> {
        self.cell.as_ptr()
    }

    /// Give up this handle's stake as a raw pointer.
    ///
    /// The stake must eventually come back through [`Shared::from_raw`].
    pub fn into_raw(this: Self) -> *mut Counted<T> {
        let ptr = this.cell.as_ptr();
        std::mem::forget(this);
        ptr
    }

    /// Reclaim a stake produced by [`Shared::into_raw`]. Null yields `None`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live cell allocated by this crate, and the
    /// caller must own one reference-count stake in it.
    pub unsafe fn from_raw(ptr: *mut Counted<T>) -> Option<Self> {
        NonNull::new(ptr).map(|cell| Self {
            cell,
            _owns: PhantomData,
        })
    }

    /// Mutable access when this is the only handle.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.ref_count() == 1 {
            // SAFETY: count is 1 and we hold `&mut self`, so no other
            // reference into the cell can exist.
            Some(unsafe { &mut (*self.cell.as_ptr()).value })
        } else {
            None
        }
    }

    /// Mutable access regardless of the count. Writes are visible to every
    /// holder of this cell.
    ///
    /// # Safety
    ///
    /// No other reference into the cell (through any handle, on any
    /// thread) may be live while the returned borrow is used.
    pub unsafe fn get_mut_unchecked(&mut self) -> &mut T {
        &mut (*self.cell.as_ptr()).value
    }
}

impl<T> Clone for Shared<T> {
    /// Increment the count and return a handle to the same cell.
    fn clone(&self) -> Self {
        let old = self.counted().ref_count.fetch_add(1, Ordering::Relaxed);
        // A wrapped count would free a cell that still has holders.
        if old <= 0 || old == i32::MAX {
            std::process::abort();
        }
        Self {
            cell: self.cell,
            _owns: PhantomData,
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if self.counted().ref_count.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);
        // SAFETY: that was the last stake. Drop the value (releasing owned
        // children) and return the cell to the allocator.
        unsafe {
            std::ptr::drop_in_place(self.cell.as_ptr());
            alloc::release(self.cell.cast(), Layout::new::<Counted<T>>());
        }
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.counted().value
    }
}

impl<T: DeepCopy> DeepCopy for Shared<T> {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        Shared::try_new(self.counted().value.deep_copy()?)
    }
}

impl<T: PartialEq> PartialEq for Shared<T> {
    /// Value equality. Use [`Shared::ptr_eq`] for identity.
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("ref_count", &self.ref_count())
            .field("value", &**self)
            .finish()
    }
}
