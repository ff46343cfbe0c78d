//! [`WatString`]: NUL-terminated text owned by this side of the boundary.
//!
//! Text handed to foreign code is a plain `char *`. It must come back
//! through `wat_string_delete` (never the caller's `free`), and text coming
//! in is duplicated into this allocator first. The byte length is kept in a
//! hidden header in front of the text, so releasing a block never depends on
//! the bytes a foreign writer may have changed.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::str::Utf8Error;

use wat_core::LifecycleError;

use crate::alloc;
use crate::copy::DeepCopy;

const HEADER: usize = size_of::<usize>();

fn layout_for(len: usize) -> Result<Layout, LifecycleError> {
    HEADER
        .checked_add(len)
        .and_then(|n| n.checked_add(1))
        .and_then(|size| Layout::from_size_align(size, align_of::<usize>()).ok())
        .ok_or(LifecycleError::CapacityOverflow { requested: len })
}

/// Boundary-owned, NUL-terminated, immutable-length text.
#[repr(transparent)]
pub struct WatString {
    text: NonNull<c_char>,
}

// SAFETY: unique owner of its block, like `Box<[u8]>`.
unsafe impl Send for WatString {}
// SAFETY: shared access is read-only.
unsafe impl Sync for WatString {}

const _: () = assert!(size_of::<Option<WatString>>() == size_of::<*mut c_char>());

impl WatString {
    /// Copy `bytes` into a new string. Fails on an interior NUL.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, LifecycleError> {
        if let Some(nul_position) = bytes.iter().position(|b| *b == 0) {
            return Err(LifecycleError::InvalidText { nul_position });
        }
        let layout = layout_for(bytes.len())?;
        let base = alloc::allocate(layout)?;
        // SAFETY: the block holds HEADER + len + 1 bytes and is usize-aligned.
        unsafe {
            base.cast::<usize>().as_ptr().write(bytes.len());
            let text = base.as_ptr().add(HEADER);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), text, bytes.len());
            text.add(bytes.len()).write(0);
            Ok(Self {
                text: NonNull::new_unchecked(text.cast()),
            })
        }
    }

    /// Copy `s` into a new string. Fails on an interior NUL.
    pub fn try_from_str(s: &str) -> Result<Self, LifecycleError> {
        Self::try_from_bytes(s.as_bytes())
    }

    /// Copy a C string into this allocator (`create_string`).
    pub fn try_from_c_str(s: &CStr) -> Result<Self, LifecycleError> {
        Self::try_from_bytes(s.to_bytes())
    }

    /// Independent copy in a fresh block.
    pub fn duplicate(&self) -> Result<Self, LifecycleError> {
        Self::try_from_bytes(self.as_bytes())
    }

    /// The text up to its first NUL.
    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: the block is NUL-terminated at `len` at the latest.
        unsafe { CStr::from_ptr(self.text.as_ptr()) }
    }

    /// Text bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.as_c_str().to_bytes()
    }

    /// The text as UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        self.as_c_str().to_str()
    }

    /// The text as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.as_c_str().to_string_lossy()
    }

    /// `true` when the text is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Pointer to the first byte.
    pub fn as_ptr(&self) -> *const c_char {
        self.text.as_ptr()
    }

    /// Give up ownership as a raw `char *`.
    pub fn into_raw(this: Self) -> *mut c_char {
        let ptr = this.text.as_ptr();
        std::mem::forget(this);
        ptr
    }

    /// Reclaim a pointer produced by [`WatString::into_raw`]. Null yields `None`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from this type (directly or through a
    /// `wat_string_create` handed to foreign code), and be reclaimed once.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(|text| Self { text })
    }

    fn base(&self) -> NonNull<u8> {
        // SAFETY: `text` is HEADER bytes past the start of its block.
        unsafe { NonNull::new_unchecked(self.text.as_ptr().cast::<u8>().sub(HEADER)) }
    }
}

impl Drop for WatString {
    fn drop(&mut self) {
        let base = self.base();
        // SAFETY: the header was written at construction and is never
        // exposed for writing; the layout is rebuilt from it exactly.
        unsafe {
            let len = base.cast::<usize>().as_ptr().read();
            let layout = Layout::from_size_align_unchecked(HEADER + len + 1, align_of::<usize>());
            alloc::release(base, layout);
        }
    }
}

impl DeepCopy for WatString {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        self.duplicate()
    }
}

impl PartialEq for WatString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for WatString {}

impl PartialEq<str> for WatString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for WatString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for WatString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for WatString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.to_string_lossy(), f)
    }
}
