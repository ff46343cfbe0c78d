//! Callback registration and host-side event firing.
//!
//! A callback receives a pointer to a fresh event cell with
//! `ref_count == 1`. The pointer is valid only for the duration of the
//! call; keep the event with `wat_<event>_clone` or `wat_<event>_copy`.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};

use wat_core::LifecycleError;
use wat_entity::{Player, PlayerJoinEvent, SignChangeEvent, StringArray};
use wat_event::{fire_player_join, fire_sign_change, registry};
use wat_heap::{lifecycle, Shared, WatString};

use crate::cell;
use crate::lifecycle::{WatPlayer, WatPlayerJoinEvent, WatSignChangeEvent, WatStringArray};
use crate::status::WatStatus;

/// Sign-change handler. Null clears the registration.
pub type WatSignChangeCallback = Option<extern "C" fn(event: *mut WatSignChangeEvent)>;

/// Player-join handler. Null clears the registration.
pub type WatPlayerJoinCallback = Option<extern "C" fn(event: *mut WatPlayerJoinEvent)>;

/// Install `callback` for sign changes, replacing any previous one.
#[no_mangle]
pub extern "C" fn wat_register_sign_change_callback(callback: WatSignChangeCallback) -> i32 {
    ffi_guard!({
        let callback = callback.map(|cb| {
            std::sync::Arc::new(move |event: &mut Shared<SignChangeEvent>| cb(event.as_ptr()))
                as wat_event::Callback<SignChangeEvent>
        });
        registry::global().set(callback);
        WatStatus::Ok as i32
    })
}

/// Install `callback` for player joins, replacing any previous one.
#[no_mangle]
pub extern "C" fn wat_register_player_join_callback(callback: WatPlayerJoinCallback) -> i32 {
    ffi_guard!({
        let callback = callback.map(|cb| {
            std::sync::Arc::new(move |event: &mut Shared<PlayerJoinEvent>| cb(event.as_ptr()))
                as wat_event::Callback<PlayerJoinEvent>
        });
        registry::global().set(callback);
        WatStatus::Ok as i32
    })
}

/// Raise a sign change for `player` writing `lines`.
///
/// Both inputs are borrowed; the event holds its own stakes. On return
/// `*cancelled_out` says whether the edit must be discarded and
/// `*lines_out` receives a stake in the lines to write (the caller's array
/// unless the callback replaced it). Either out-parameter may be null. With
/// no callback the edit stands: not cancelled, `*lines_out` a clone of
/// `lines`. On failure `*lines_out` is null.
#[no_mangle]
pub extern "C" fn wat_sign_change_fire(
    player: *mut WatPlayer,
    lines: *mut WatStringArray,
    cancelled_out: *mut bool,
    lines_out: *mut *mut WatStringArray,
) -> i32 {
    ffi_guard!({
        // SAFETY: both are null or live cells borrowed for this call.
        let player = unsafe { cell::peek::<Shared<Player>>(player) };
        let lines = unsafe { cell::peek::<Shared<StringArray>>(lines) };

        let fired = fire_sign_change(registry::global(), player.as_deref(), lines.as_deref());
        let status = WatStatus::from_result(&fired);
        let (cancelled, final_lines) = match fired {
            Ok(Some(outcome)) => (outcome.cancelled, outcome.lines),
            Ok(None) => (false, lifecycle::clone(lines.as_deref())),
            Err(_) => (false, None),
        };

        // SAFETY: `cancelled_out` is null or writable.
        if let Some(out) = unsafe { cancelled_out.as_mut() } {
            *out = cancelled;
        }
        // SAFETY: `lines_out` is null or writable; a null one releases the stake.
        unsafe { cell::store(lines_out, final_lines) };
        status as i32
    })
}

/// Raise a join for `player` with default broadcast `message`.
///
/// `*message_out` receives a new wat-owned string holding the message to
/// broadcast, or null when the callback suppressed it (or `message` was
/// null and untouched). Release it with `wat_string_delete`.
#[no_mangle]
pub extern "C" fn wat_player_join_fire(
    player: *mut WatPlayer,
    message: *const c_char,
    message_out: *mut *mut c_char,
) -> i32 {
    ffi_guard!({
        let message = if message.is_null() {
            None
        } else {
            // SAFETY: non-null, NUL-terminated per caller contract.
            match unsafe { CStr::from_ptr(message) }.to_str() {
                Ok(text) => Some(text),
                Err(_) => {
                    // SAFETY: `message_out` is null or writable.
                    unsafe { cell::store::<WatString>(message_out, None) };
                    return WatStatus::InvalidText as i32;
                }
            }
        };
        // SAFETY: null or a live cell borrowed for this call.
        let player = unsafe { cell::peek::<Shared<Player>>(player) };

        let decided = fire_player_join(registry::global(), player.as_deref(), message)
            .and_then(|fired| match fired {
                Some(outcome) => Ok(outcome.join_message),
                None => message.map(WatString::try_from_str).transpose(),
            });
        let status = WatStatus::from_result(&decided);
        if let Err(LifecycleError::AllocationFailed { bytes }) = &decided {
            tracing::warn!(bytes, "player join dispatch ran out of memory");
        }
        // SAFETY: `message_out` is null or writable.
        unsafe { cell::store(message_out, decided.ok().flatten()) };
        status as i32
    })
}
