//! Raw pointer views of the handle types.
//!
//! A C `T *` is the bit pattern of an `Option<H>` for every handle type
//! `H` ([`Shared`], [`WatString`], [`Owned`]): each is a transparent
//! non-null pointer, so null is `None`. These helpers reinterpret pointers
//! and slots without touching reference counts; whether a stake moves is
//! decided by the caller.

#![allow(unsafe_code)]

use std::ffi::c_char;
use std::mem::ManuallyDrop;

use wat_heap::{Counted, Owned, Shared, WatString};

/// A handle type with a C pointer representation.
pub trait Handle: Sized {
    /// The pointee type in C.
    type Raw;

    /// Reclaim a stake from a raw pointer. Null yields `None`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live pointer of this handle type, and the
    /// caller must own the stake being reclaimed.
    unsafe fn adopt(raw: *mut Self::Raw) -> Option<Self>;

    /// Give up this stake as a raw pointer.
    fn release_to_raw(this: Self) -> *mut Self::Raw;
}

impl<T> Handle for Shared<T> {
    type Raw = Counted<T>;

    unsafe fn adopt(raw: *mut Counted<T>) -> Option<Self> {
        // SAFETY: forwarded from the caller.
        unsafe { Shared::from_raw(raw) }
    }

    fn release_to_raw(this: Self) -> *mut Counted<T> {
        Shared::into_raw(this)
    }
}

impl Handle for WatString {
    type Raw = c_char;

    unsafe fn adopt(raw: *mut c_char) -> Option<Self> {
        // SAFETY: forwarded from the caller.
        unsafe { WatString::from_raw(raw) }
    }

    fn release_to_raw(this: Self) -> *mut c_char {
        WatString::into_raw(this)
    }
}

impl<T> Handle for Owned<T> {
    type Raw = T;

    unsafe fn adopt(raw: *mut T) -> Option<Self> {
        // SAFETY: forwarded from the caller.
        unsafe { Owned::from_raw(raw) }
    }

    fn release_to_raw(this: Self) -> *mut T {
        Owned::into_raw(this)
    }
}

/// A borrowed view of `raw` as a handle, without taking a stake.
///
/// # Safety
///
/// `raw` must be null or a live pointer of this handle type that stays
/// valid while the view is used.
pub unsafe fn peek<H: Handle>(raw: *mut H::Raw) -> Option<ManuallyDrop<H>> {
    // SAFETY: the view is never dropped, so no stake is consumed.
    unsafe { H::adopt(raw) }.map(ManuallyDrop::new)
}

/// View a `T **` slot as an `Option<H>` slot.
///
/// # Safety
///
/// `slot` must be null or point to a pointer that is itself null or a live
/// stake of this handle type.
pub unsafe fn slot<'a, H: Handle>(slot: *mut *mut H::Raw) -> Option<&'a mut Option<H>> {
    // SAFETY: `Option<H>` and `*mut H::Raw` share a layout.
    unsafe { slot.cast::<Option<H>>().as_mut() }
}

/// Write `value` into an out-parameter without reading what was there.
///
/// Returns `false` (dropping `value`) when `out` is null.
///
/// # Safety
///
/// `out` must be null or valid for a pointer-sized write.
pub unsafe fn store<H: Handle>(out: *mut *mut H::Raw, value: Option<H>) -> bool {
    if out.is_null() {
        return false;
    }
    let raw = value.map_or(std::ptr::null_mut(), H::release_to_raw);
    // SAFETY: non-null and writable per the caller.
    unsafe { out.write(raw) };
    true
}

/// Mutable access to the value in a cell, regardless of its count.
///
/// # Safety
///
/// `raw` must be null or a live cell, and no other reference into it may
/// be used while the returned borrow is alive.
pub unsafe fn value_mut<'a, T>(raw: *mut Counted<T>) -> Option<&'a mut T> {
    // SAFETY: the handle is never dropped; the borrow outlives it only as
    // long as the cell itself, which the caller guarantees.
    unsafe {
        let mut handle = ManuallyDrop::new(Shared::from_raw(raw)?);
        Some(&mut *(handle.get_mut_unchecked() as *mut T))
    }
}
