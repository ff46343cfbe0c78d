//! Lifecycle entry points for every record and array type.
//!
//! Each type gets:
//!
//! - `wat_<t>_new(out)`: default instance with `ref_count == 1`.
//! - `wat_<t>_delete(slot)`: release one stake, always null the slot.
//! - `wat_<t>_clone(p)`: one more stake in the same cell.
//! - `wat_<t>_copy(out, src)`: independent deep copy.
//! - `wat_<t>_reassign(slot, newval)`: release the old stake, store
//!   `newval` (whose stake the slot takes over).
//!
//! Array types also get `wat_<t>_add(array, entry, mode)` with
//! `mode` = `WAT_CLONE` (0) or `WAT_COPY` (1).
//!
//! Out-parameters are written without being read, so they may be
//! uninitialised.

use std::ffi::c_char;

use wat_core::LifecycleError;
use wat_entity::{
    Block, Chunk, ChunkArray, Entity, EntityArray, Location, Player, PlayerArray,
    PlayerJoinEvent, SignChangeEvent, StringArray, Vector, World,
};
use wat_heap::{lifecycle, AppendMode, Counted, Shared, WatString};

use crate::cell::{self, Handle};
use crate::status::WatStatus;

/// `append` mode: share the entry (clone).
pub const WAT_CLONE: i32 = AppendMode::Share as i32;
/// `append` mode: store an independent copy (deep copy).
pub const WAT_COPY: i32 = AppendMode::Isolate as i32;

macro_rules! export_lifecycle {
    (
        $(#[$doc:meta])*
        $c:ident = $t:ty {
            new: $new:ident,
            delete: $delete:ident,
            clone: $clone:ident,
            copy: $copy:ident,
            reassign: $reassign:ident $(,)?
        }
    ) => {
        $(#[$doc])*
        pub type $c = Counted<$t>;

        #[doc = concat!("Allocate a default `", stringify!($c), "` into `*out`.")]
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $new(out: *mut *mut $c) -> i32 {
            ffi_guard!({
                if out.is_null() {
                    return WatStatus::InvalidArgument as i32;
                }
                let fresh = Shared::try_new(<$t>::default());
                let status = WatStatus::from_result(&fresh);
                // SAFETY: `out` is non-null and writable per caller contract.
                unsafe { cell::store(out, fresh.ok()) };
                status as i32
            })
        }

        /// Release one stake in `*slot` and set it to null. Null is a no-op.
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $delete(slot: *mut *mut $c) {
            ffi_guard_or!((), {
                // SAFETY: `slot` is null or holds null or a live stake.
                if let Some(slot) = unsafe { cell::slot::<Shared<$t>>(slot) } {
                    lifecycle::delete(slot);
                }
            })
        }

        /// Take another stake in `value` and return the same pointer.
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $clone(value: *mut $c) -> *mut $c {
            ffi_guard_or!(std::ptr::null_mut(), {
                // SAFETY: `value` is null or a live cell.
                let view = unsafe { cell::peek::<Shared<$t>>(value) };
                lifecycle::clone(view.as_deref()).map_or(std::ptr::null_mut(), Shared::into_raw)
            })
        }

        /// Deep copy `src` into `*out`. A null `src` stores null.
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $copy(out: *mut *mut $c, src: *mut $c) -> i32 {
            ffi_guard!({
                if out.is_null() {
                    return WatStatus::InvalidArgument as i32;
                }
                // SAFETY: `src` is null or a live cell.
                let view = unsafe { cell::peek::<Shared<$t>>(src) };
                let copied = lifecycle::deep_copy(view.as_deref());
                let status = WatStatus::from_result(&copied);
                // SAFETY: `out` is non-null and writable per caller contract.
                unsafe { cell::store(out, copied.ok().flatten()) };
                status as i32
            })
        }

        /// Release the stake in `*slot` and store `newval`, taking over its stake.
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $reassign(slot: *mut *mut $c, newval: *mut $c) {
            ffi_guard_or!((), {
                // SAFETY: the caller hands over its stake in `newval`.
                let value = unsafe { Shared::<$t>::adopt(newval) };
                // SAFETY: `slot` is null or holds null or a live stake.
                match unsafe { cell::slot::<Shared<$t>>(slot) } {
                    Some(slot) => lifecycle::reassign(slot, value),
                    None => drop(value),
                }
            })
        }
    };
}

macro_rules! export_array_add {
    ($add:ident: $c:ident of $h:ty, entry: $raw:ty) => {
        /// Append `entry` to `array` with `mode` `WAT_CLONE` or `WAT_COPY`.
        ///
        /// A null `entry` succeeds without change; on failure the array is
        /// unchanged.
        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn $add(array: *mut $c, entry: *mut $raw, mode: i32) -> i32 {
            ffi_guard!({
                // SAFETY: shared mutation is allowed through the C boundary;
                // `array` is null or a live cell.
                let Some(array) = (unsafe { cell::value_mut(array) }) else {
                    return WatStatus::from(&LifecycleError::NullArgument { name: "array" }) as i32;
                };
                let mode = match AppendMode::try_from(mode) {
                    Ok(mode) => mode,
                    Err(e) => return WatStatus::from(&e) as i32,
                };
                // SAFETY: `entry` is null or a live handle of this element type.
                let entry = unsafe { cell::peek::<$h>(entry) };
                let appended = lifecycle::append(Some(array), entry.as_deref(), mode);
                WatStatus::from_result(&appended) as i32
            })
        }
    };
}

export_lifecycle! {
    /// C view of a [`Vector`] cell.
    WatVector = Vector {
        new: wat_vector_new,
        delete: wat_vector_delete,
        clone: wat_vector_clone,
        copy: wat_vector_copy,
        reassign: wat_vector_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`Location`] cell.
    WatLocation = Location {
        new: wat_location_new,
        delete: wat_location_delete,
        clone: wat_location_clone,
        copy: wat_location_copy,
        reassign: wat_location_reassign,
    }
}

export_lifecycle! {
    /// C view of an [`Entity`] cell.
    WatEntity = Entity {
        new: wat_entity_new,
        delete: wat_entity_delete,
        clone: wat_entity_clone,
        copy: wat_entity_copy,
        reassign: wat_entity_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`Player`] cell.
    WatPlayer = Player {
        new: wat_player_new,
        delete: wat_player_delete,
        clone: wat_player_clone,
        copy: wat_player_copy,
        reassign: wat_player_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`Block`] cell.
    WatBlock = Block {
        new: wat_block_new,
        delete: wat_block_delete,
        clone: wat_block_clone,
        copy: wat_block_copy,
        reassign: wat_block_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`Chunk`] cell.
    WatChunk = Chunk {
        new: wat_chunk_new,
        delete: wat_chunk_delete,
        clone: wat_chunk_clone,
        copy: wat_chunk_copy,
        reassign: wat_chunk_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`World`] cell.
    WatWorld = World {
        new: wat_world_new,
        delete: wat_world_delete,
        clone: wat_world_clone,
        copy: wat_world_copy,
        reassign: wat_world_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`SignChangeEvent`] cell.
    WatSignChangeEvent = SignChangeEvent {
        new: wat_sign_change_event_new,
        delete: wat_sign_change_event_delete,
        clone: wat_sign_change_event_clone,
        copy: wat_sign_change_event_copy,
        reassign: wat_sign_change_event_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`PlayerJoinEvent`] cell.
    WatPlayerJoinEvent = PlayerJoinEvent {
        new: wat_player_join_event_new,
        delete: wat_player_join_event_delete,
        clone: wat_player_join_event_clone,
        copy: wat_player_join_event_copy,
        reassign: wat_player_join_event_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`PlayerArray`] cell.
    WatPlayerArray = PlayerArray {
        new: wat_player_array_new,
        delete: wat_player_array_delete,
        clone: wat_player_array_clone,
        copy: wat_player_array_copy,
        reassign: wat_player_array_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`ChunkArray`] cell.
    WatChunkArray = ChunkArray {
        new: wat_chunk_array_new,
        delete: wat_chunk_array_delete,
        clone: wat_chunk_array_clone,
        copy: wat_chunk_array_copy,
        reassign: wat_chunk_array_reassign,
    }
}

export_lifecycle! {
    /// C view of an [`EntityArray`] cell.
    WatEntityArray = EntityArray {
        new: wat_entity_array_new,
        delete: wat_entity_array_delete,
        clone: wat_entity_array_clone,
        copy: wat_entity_array_copy,
        reassign: wat_entity_array_reassign,
    }
}

export_lifecycle! {
    /// C view of a [`StringArray`] cell.
    WatStringArray = StringArray {
        new: wat_string_array_new,
        delete: wat_string_array_delete,
        clone: wat_string_array_clone,
        copy: wat_string_array_copy,
        reassign: wat_string_array_reassign,
    }
}

export_array_add!(wat_player_array_add: WatPlayerArray of Shared<Player>, entry: WatPlayer);
export_array_add!(wat_chunk_array_add: WatChunkArray of Shared<Chunk>, entry: WatChunk);
export_array_add!(wat_entity_array_add: WatEntityArray of Shared<Entity>, entry: WatEntity);
export_array_add!(wat_string_array_add: WatStringArray of WatString, entry: c_char);

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::ptr;
    use wat_heap::alloc::{stats, FailAfter};

    fn new_entity() -> *mut WatEntity {
        let mut e: *mut WatEntity = ptr::null_mut();
        assert_eq!(wat_entity_new(&mut e), WatStatus::Ok as i32);
        e
    }

    #[test]
    fn new_then_delete_frees_exactly_once() {
        let before = stats();
        let mut v: *mut WatVector = ptr::null_mut();
        assert_eq!(wat_vector_new(&mut v), WatStatus::Ok as i32);
        assert_eq!(unsafe { (*v).ref_count() }, 1);
        let mut alias = wat_vector_clone(v);
        assert_eq!(alias, v);
        assert_eq!(unsafe { (*v).ref_count() }, 2);
        wat_vector_delete(&mut alias);
        assert!(alias.is_null());
        assert_eq!(stats().since(before).releases, 0);
        wat_vector_delete(&mut v);
        assert!(v.is_null());
        let delta = stats().since(before);
        assert_eq!((delta.allocations, delta.releases), (1, 1));
    }

    #[test]
    fn null_inputs_are_benign() {
        wat_world_delete(ptr::null_mut());
        let mut null: *mut WatWorld = ptr::null_mut();
        wat_world_delete(&mut null);
        assert!(wat_world_clone(ptr::null_mut()).is_null());
        let mut out: *mut WatWorld = ptr::NonNull::dangling().as_ptr();
        assert_eq!(wat_world_copy(&mut out, ptr::null_mut()), WatStatus::Ok as i32);
        assert!(out.is_null());
    }

    #[test]
    fn copy_requires_out_slot() {
        let mut e = new_entity();
        assert_eq!(
            wat_entity_copy(ptr::null_mut(), e),
            WatStatus::InvalidArgument as i32
        );
        wat_entity_delete(&mut e);
    }

    #[test]
    fn copy_is_independent() {
        let mut e = new_entity();
        // SAFETY: `e` is a live, uniquely held cell.
        unsafe { cell::value_mut(e).unwrap().fire_ticks = 20 };
        let mut c: *mut WatEntity = ptr::null_mut();
        assert_eq!(wat_entity_copy(&mut c, e), WatStatus::Ok as i32);
        assert_ne!(c, e);
        unsafe {
            assert_eq!((*c).ref_count(), 1);
            assert_eq!((*c).value().fire_ticks, 20);
            cell::value_mut(c).unwrap().fire_ticks = 1;
            assert_eq!((*e).value().fire_ticks, 20);
        }
        wat_entity_delete(&mut c);
        wat_entity_delete(&mut e);
    }

    #[test]
    fn failed_copy_nulls_out() {
        let mut e = new_entity();
        let mut c: *mut WatEntity = ptr::NonNull::dangling().as_ptr();
        let status = {
            let _guard = FailAfter::now();
            wat_entity_copy(&mut c, e)
        };
        assert_eq!(status, WatStatus::AllocationFailed as i32);
        assert!(c.is_null());
        wat_entity_delete(&mut e);
    }

    #[test]
    fn reassign_takes_over_newval() {
        let mut slot = new_entity();
        let other = new_entity();
        let keep = wat_entity_clone(slot);
        wat_entity_reassign(&mut slot, other);
        assert_eq!(slot, other);
        assert_eq!(unsafe { (*keep).ref_count() }, 1);
        assert_eq!(unsafe { (*other).ref_count() }, 1);
        let mut keep = keep;
        wat_entity_delete(&mut keep);
        wat_entity_delete(&mut slot);
    }

    #[test]
    fn reassign_with_aliased_clone() {
        let mut slot = new_entity();
        let alias = wat_entity_clone(slot);
        wat_entity_reassign(&mut slot, alias);
        assert_eq!(slot, alias);
        assert_eq!(unsafe { (*slot).ref_count() }, 1);
        wat_entity_reassign(&mut slot, ptr::null_mut());
        assert!(slot.is_null());
    }

    #[test]
    fn array_add_modes() {
        let mut players: *mut WatPlayerArray = ptr::null_mut();
        assert_eq!(wat_player_array_new(&mut players), WatStatus::Ok as i32);
        let mut p: *mut WatPlayer = ptr::null_mut();
        wat_player_new(&mut p);

        assert_eq!(wat_player_array_add(players, p, WAT_CLONE), WatStatus::Ok as i32);
        assert_eq!(unsafe { (*p).ref_count() }, 2);
        assert_eq!(wat_player_array_add(players, p, WAT_COPY), WatStatus::Ok as i32);
        assert_eq!(unsafe { (*p).ref_count() }, 2);
        assert_eq!(wat_player_array_add(players, ptr::null_mut(), WAT_COPY), WatStatus::Ok as i32);
        assert_eq!(unsafe { (*players).value().len() }, 2);

        assert_eq!(wat_player_array_add(players, p, 5), WatStatus::InvalidMode as i32);
        assert_eq!(
            wat_player_array_add(ptr::null_mut(), p, WAT_CLONE),
            WatStatus::InvalidArgument as i32
        );

        wat_player_array_delete(&mut players);
        assert_eq!(unsafe { (*p).ref_count() }, 1);
        wat_player_delete(&mut p);
    }

    #[test]
    fn failed_isolate_add_keeps_length() {
        let mut entities: *mut WatEntityArray = ptr::null_mut();
        wat_entity_array_new(&mut entities);
        let mut e = new_entity();
        for _ in 0..3 {
            assert_eq!(wat_entity_array_add(entities, e, WAT_COPY), WatStatus::Ok as i32);
        }
        let status = {
            let _guard = FailAfter::now();
            wat_entity_array_add(entities, e, WAT_COPY)
        };
        assert_eq!(status, WatStatus::AllocationFailed as i32);
        assert_eq!(unsafe { (*entities).value().len() }, 3);

        // fill to capacity, then fail the copy that would need a bigger buffer
        while unsafe { (*entities).value().len() < (*entities).value().capacity() } {
            assert_eq!(wat_entity_array_add(entities, e, WAT_COPY), WatStatus::Ok as i32);
        }
        let header = |a: *mut WatEntityArray| {
            let a = unsafe { (*a).value() };
            (a.len(), a.capacity(), a.as_slice().as_ptr())
        };
        let full = header(entities);
        for successes in [0, 1] {
            let _guard = FailAfter::new(successes);
            assert_eq!(
                wat_entity_array_add(entities, e, WAT_COPY),
                WatStatus::AllocationFailed as i32
            );
            assert_eq!(header(entities), full);
        }
        wat_entity_array_delete(&mut entities);
        wat_entity_delete(&mut e);
    }

    #[test]
    fn string_array_add_duplicates_text() {
        let mut lines: *mut WatStringArray = ptr::null_mut();
        wat_string_array_new(&mut lines);
        let text = WatString::into_raw(WatString::try_from_str("&4hi").unwrap());
        assert_eq!(wat_string_array_add(lines, text, WAT_CLONE), WatStatus::Ok as i32);
        let stored = unsafe { (*lines).value().get(0).unwrap().as_ptr() };
        assert_ne!(stored, text as *const _);
        drop(unsafe { WatString::from_raw(text) });
        wat_string_array_delete(&mut lines);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn array_add_length_arithmetic(modes in proptest::collection::vec(0i32..3, 0..24)) {
                let before = stats();
                let mut chunks: *mut WatChunkArray = ptr::null_mut();
                let mut chunk: *mut WatChunk = ptr::null_mut();
                wat_chunk_array_new(&mut chunks);
                wat_chunk_new(&mut chunk);
                let mut shared = 0;
                let mut total = 0;
                for mode in modes {
                    let status = wat_chunk_array_add(chunks, chunk, mode);
                    match mode {
                        WAT_CLONE => { shared += 1; total += 1; }
                        WAT_COPY => total += 1,
                        _ => prop_assert_eq!(status, WatStatus::InvalidMode as i32),
                    }
                }
                prop_assert_eq!(unsafe { (*chunks).value().len() }, total);
                prop_assert_eq!(unsafe { (*chunk).ref_count() }, 1 + shared);
                wat_chunk_array_delete(&mut chunks);
                prop_assert_eq!(unsafe { (*chunk).ref_count() }, 1);
                wat_chunk_delete(&mut chunk);
                prop_assert_eq!(stats().since(before).live(), 0);
            }
        }
    }
}
