//! [`Owned<T>`]: an exclusively owned heap cell, never reference counted.
//!
//! Identifiers live in these (`Option<Owned<Uuid>>`, a nullable `uuid *`
//! in C). Duplicating one is a [`DeepCopy`]; it is released with its
//! containing record.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use wat_core::LifecycleError;

use crate::alloc;
use crate::copy::DeepCopy;

/// Exclusively owned, fallibly allocated `T`.
#[repr(transparent)]
pub struct Owned<T> {
    ptr: NonNull<T>,
    _owns: PhantomData<T>,
}

// SAFETY: `Owned<T>` is a unique owner, like `Box<T>`.
unsafe impl<T: Send> Send for Owned<T> {}
// SAFETY: as above.
unsafe impl<T: Sync> Sync for Owned<T> {}

impl<T> Owned<T> {
    /// Move `value` into a fresh cell.
    pub fn try_new(value: T) -> Result<Self, LifecycleError> {
        const { assert!(std::mem::size_of::<T>() > 0, "Owned<T> needs a non-zero-sized payload") };
        let ptr = alloc::allocate(Layout::new::<T>())?.cast::<T>();
        // SAFETY: fresh block sized and aligned for `T`.
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self {
            ptr,
            _owns: PhantomData,
        })
    }

    /// Give up ownership as a raw pointer.
    pub fn into_raw(this: Self) -> *mut T {
        let ptr = this.ptr.as_ptr();
        std::mem::forget(this);
        ptr
    }

    /// Reclaim a pointer produced by [`Owned::into_raw`]. Null yields `None`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from [`Owned::into_raw`] for the same `T`,
    /// and must not be reclaimed twice.
    pub unsafe fn from_raw(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            _owns: PhantomData,
        })
    }

    /// Move the value out, releasing the cell.
    pub fn into_inner(this: Self) -> T {
        let ptr = this.ptr;
        std::mem::forget(this);
        // SAFETY: we owned the cell; read the value out, then free it
        // without running `T`'s destructor a second time.
        unsafe {
            let value = ptr.as_ptr().read();
            alloc::release(ptr.cast(), Layout::new::<T>());
            value
        }
    }
}

impl<T> Drop for Owned<T> {
    fn drop(&mut self) {
        // SAFETY: unique owner; the cell came from `alloc::allocate`.
        unsafe {
            std::ptr::drop_in_place(self.ptr.as_ptr());
            alloc::release(self.ptr.cast(), Layout::new::<T>());
        }
    }
}

impl<T> Deref for Owned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the cell is initialised and uniquely owned.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for Owned<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: DeepCopy> DeepCopy for Owned<T> {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        Owned::try_new((**self).deep_copy()?)
    }
}

impl<T: PartialEq> PartialEq for Owned<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq> Eq for Owned<T> {}

impl<T: fmt::Debug> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}
