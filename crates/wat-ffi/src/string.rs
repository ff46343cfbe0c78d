//! Ownership transfer for text and identifiers.
//!
//! Text and identifiers are not reference counted. A record owns its
//! strings and `wat_uuid` cells and releases them with itself; to keep one
//! past the record, copy it and release the copy yourself.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};

use wat_core::{Uuid, UUID_SIZE};
use wat_heap::{lifecycle, Owned, WatString};

use crate::cell;
use crate::status::WatStatus;

// ── Strings ─────────────────────────────────────────────────────

/// Duplicate a C string into wat-owned storage.
///
/// Returns null if `text` is null or allocation fails. Release the result
/// with [`wat_string_delete`].
#[no_mangle]
pub extern "C" fn wat_string_create(text: *const c_char) -> *mut c_char {
    ffi_guard_or!(std::ptr::null_mut(), {
        if text.is_null() {
            return std::ptr::null_mut();
        }
        // SAFETY: non-null, NUL-terminated per caller contract.
        let text = unsafe { CStr::from_ptr(text) };
        match WatString::try_from_c_str(text) {
            Ok(owned) => WatString::into_raw(owned),
            Err(err) => {
                tracing::warn!(error = %err, "wat_string_create failed");
                std::ptr::null_mut()
            }
        }
    })
}

/// Release a wat-owned string and set `*slot` to null. Null is a no-op.
#[no_mangle]
pub extern "C" fn wat_string_delete(slot: *mut *mut c_char) {
    ffi_guard_or!((), {
        // SAFETY: `slot` is null or holds null or a wat-owned string.
        if let Some(slot) = unsafe { cell::slot::<WatString>(slot) } {
            lifecycle::delete(slot);
        }
    })
}

// ── Identifiers ─────────────────────────────────────────────────

/// Allocate an identifier from 16 raw bytes into `*out`.
#[no_mangle]
pub extern "C" fn wat_uuid_new(out: *mut *mut Uuid, bytes: *const u8) -> i32 {
    ffi_guard!({
        if out.is_null() || bytes.is_null() {
            return WatStatus::InvalidArgument as i32;
        }
        let mut raw = [0u8; UUID_SIZE];
        // SAFETY: `bytes` points to at least 16 readable bytes.
        unsafe { std::ptr::copy_nonoverlapping(bytes, raw.as_mut_ptr(), UUID_SIZE) };
        let id = Owned::try_new(Uuid::from_bytes(raw));
        let status = WatStatus::from_result(&id);
        // SAFETY: `out` is non-null and writable.
        unsafe { cell::store(out, id.ok()) };
        status as i32
    })
}

/// Copy `src` into a new cell at `*dest`. A null `src` stores null.
///
/// `dest` is required. Its previous content is not released.
#[no_mangle]
pub extern "C" fn wat_uuid_copy(dest: *mut *mut Uuid, src: *const Uuid) -> i32 {
    ffi_guard!({
        if dest.is_null() {
            return WatStatus::InvalidArgument as i32;
        }
        // SAFETY: `src` is null or a readable identifier.
        let copied = unsafe { src.as_ref() }.map(|id| Owned::try_new(*id)).transpose();
        let status = WatStatus::from_result(&copied);
        // SAFETY: `dest` is non-null and writable.
        unsafe { cell::store(dest, copied.ok().flatten()) };
        status as i32
    })
}

/// Release an identifier cell and set `*slot` to null. Null is a no-op.
#[no_mangle]
pub extern "C" fn wat_uuid_delete(slot: *mut *mut Uuid) {
    ffi_guard_or!((), {
        // SAFETY: `slot` is null or holds null or a wat-owned identifier.
        if let Some(slot) = unsafe { cell::slot::<Owned<Uuid>>(slot) } {
            lifecycle::delete(slot);
        }
    })
}

/// Format `id` as hyphenated lowercase hex in a new wat-owned string.
///
/// Returns null if `id` is null or allocation fails.
#[no_mangle]
pub extern "C" fn wat_uuid_to_string(id: *const Uuid) -> *mut c_char {
    ffi_guard_or!(std::ptr::null_mut(), {
        // SAFETY: `id` is null or a readable identifier.
        let Some(id) = (unsafe { id.as_ref() }) else {
            return std::ptr::null_mut();
        };
        WatString::try_from_str(&id.to_string()).map_or(std::ptr::null_mut(), WatString::into_raw)
    })
}

/// Parse hyphenated or plain hex text into `*out` (no allocation).
#[no_mangle]
pub extern "C" fn wat_uuid_parse(text: *const c_char, out: *mut Uuid) -> i32 {
    ffi_guard!({
        if text.is_null() || out.is_null() {
            return WatStatus::InvalidArgument as i32;
        }
        // SAFETY: non-null, NUL-terminated per caller contract.
        let Ok(text) = unsafe { CStr::from_ptr(text) }.to_str() else {
            return WatStatus::InvalidText as i32;
        };
        match text.parse::<Uuid>() {
            Ok(id) => {
                // SAFETY: `out` is non-null and writable.
                unsafe { out.write(id) };
                WatStatus::Ok as i32
            }
            Err(_) => WatStatus::InvalidText as i32,
        }
    })
}
