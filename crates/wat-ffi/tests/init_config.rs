//! `wat_init` before anything else allocates: the growth policy it installs
//! is the one arrays use. Kept to a single test so nothing latches the
//! default configuration first.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::ptr;

use wat_ffi::lifecycle::*;
use wat_ffi::{wat_close, wat_init, WatInitOptions, WatStatus};

#[test]
fn initial_options_drive_array_growth() {
    let filter = CString::new("wat_event=debug,info").unwrap();
    let options = WatInitOptions {
        array_initial_capacity: 8,
        array_growth_factor: 3,
        log_filter: filter.as_ptr(),
    };
    assert_eq!(wat_init(&options), WatStatus::Ok as i32);
    assert_eq!(wat_init(&options), WatStatus::Ok as i32);
    assert_eq!(wat_init(ptr::null()), WatStatus::AlreadyInitialized as i32);

    let mut players: *mut WatPlayerArray = ptr::null_mut();
    let mut player: *mut WatPlayer = ptr::null_mut();
    assert_eq!(wat_player_array_new(&mut players), WatStatus::Ok as i32);
    assert_eq!(wat_player_new(&mut player), WatStatus::Ok as i32);

    let capacity = |array: *mut WatPlayerArray| unsafe { &*array }.value().capacity();
    assert_eq!(capacity(players), 0);
    assert_eq!(wat_player_array_add(players, player, WAT_CLONE), WatStatus::Ok as i32);
    assert_eq!(capacity(players), 8);
    for _ in 0..8 {
        assert_eq!(wat_player_array_add(players, player, WAT_CLONE), WatStatus::Ok as i32);
    }
    assert_eq!(capacity(players), 24);
    assert_eq!(unsafe { (*player).ref_count() }, 10);

    wat_player_array_delete(&mut players);
    assert_eq!(unsafe { (*player).ref_count() }, 1);
    wat_player_delete(&mut player);
    assert_eq!(wat_close(), WatStatus::Ok as i32);
}
