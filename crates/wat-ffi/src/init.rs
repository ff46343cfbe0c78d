//! Process start-up and shutdown: `wat_init` and `wat_close`.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};

use wat_core::config::{self, ArrayGrowth, WatConfig};
use wat_core::ConfigError;
use wat_event::registry;

use crate::log;
use crate::status::WatStatus;

/// Options for [`wat_init`]. Obtain defaults with
/// [`wat_init_options_default`] and override what you need.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct WatInitOptions {
    /// Capacity of an array's first allocation (at least 1).
    pub array_initial_capacity: u32,
    /// Geometric growth multiplier (at least 2).
    pub array_growth_factor: u32,
    /// `tracing` filter directives, or null to use `WAT_LOG` then `info`.
    pub log_filter: *const c_char,
}

impl Default for WatInitOptions {
    fn default() -> Self {
        Self {
            array_initial_capacity: ArrayGrowth::DEFAULT_INITIAL_CAPACITY,
            array_growth_factor: ArrayGrowth::DEFAULT_GROWTH_FACTOR,
            log_filter: std::ptr::null(),
        }
    }
}

impl WatInitOptions {
    /// Read the options into a configuration.
    ///
    /// # Safety
    ///
    /// `log_filter` must be null or a NUL-terminated string.
    unsafe fn to_config(&self) -> Result<WatConfig, WatStatus> {
        let log_filter = if self.log_filter.is_null() {
            None
        } else {
            // SAFETY: forwarded from the caller.
            let text = unsafe { CStr::from_ptr(self.log_filter) };
            Some(text.to_str().map_err(|_| WatStatus::InvalidText)?.to_owned())
        };
        Ok(WatConfig {
            array: ArrayGrowth {
                initial_capacity: self.array_initial_capacity,
                growth_factor: self.array_growth_factor,
            },
            log_filter,
        })
    }
}

/// Write the default options into `*out`.
#[no_mangle]
pub extern "C" fn wat_init_options_default(out: *mut WatInitOptions) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return WatStatus::InvalidArgument as i32;
        }
        // SAFETY: non-null and writable per caller contract.
        unsafe { out.write(WatInitOptions::default()) };
        WatStatus::Ok as i32
    })
}

/// Install configuration and logging for the process.
///
/// A null `options` means defaults. Call it before any other wat function;
/// the first array growth latches the default configuration otherwise.
/// Calling it again with the configuration already in force succeeds; a
/// different one fails with `AlreadyInitialized`.
#[no_mangle]
pub extern "C" fn wat_init(options: *const WatInitOptions) -> i32 {
    ffi_guard!({
        // SAFETY: `options` is null or a readable options struct.
        let config = match unsafe { options.as_ref() } {
            None => WatConfig::default(),
            // SAFETY: `log_filter` is null or NUL-terminated per contract.
            Some(options) => match unsafe { options.to_config() } {
                Ok(config) => config,
                Err(status) => return status as i32,
            },
        };
        match install(config) {
            Ok(status) => status as i32,
            Err(status) => status as i32,
        }
    })
}

fn install(config: WatConfig) -> Result<WatStatus, WatStatus> {
    let installed = match config::install(config.clone()) {
        Ok(installed) => installed,
        Err(ConfigError::AlreadyInstalled) if config::current() == &config => config::current(),
        Err(err) => {
            tracing::warn!(error = %err, "wat_init rejected configuration");
            return Err(WatStatus::from(&err));
        }
    };
    let fresh_subscriber = log::init_logging(installed.log_filter.as_deref());
    tracing::info!(
        initial_capacity = installed.array.initial_capacity,
        growth_factor = installed.array.growth_factor,
        fresh_subscriber,
        "wat initialised"
    );
    Ok(WatStatus::Ok)
}

/// Clear every event callback and the log sink.
///
/// Configuration stays installed. Records and arrays still held by the
/// host remain valid and must be released as usual.
#[no_mangle]
pub extern "C" fn wat_close() -> i32 {
    ffi_guard!({
        registry::global().clear();
        log::set_sink(None);
        tracing::debug!("wat closed");
        WatStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::wat_register_sign_change_callback;
    use crate::lifecycle::WatSignChangeEvent;
    use std::ffi::CString;
    use wat_entity::SignChangeEvent;

    extern "C" fn ignore(_: *mut WatSignChangeEvent) {}

    #[test]
    fn default_options_match_default_config() {
        let mut options = WatInitOptions {
            array_initial_capacity: 0,
            array_growth_factor: 0,
            log_filter: std::ptr::null(),
        };
        assert_eq!(wat_init_options_default(&mut options), WatStatus::Ok as i32);
        let config = unsafe { options.to_config() }.unwrap();
        assert_eq!(config, WatConfig::default());
        assert_eq!(
            wat_init_options_default(std::ptr::null_mut()),
            WatStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn invalid_options_are_rejected_before_install() {
        let options = WatInitOptions {
            array_growth_factor: 1,
            ..WatInitOptions::default()
        };
        assert_eq!(wat_init(&options), WatStatus::ConfigError as i32);

        let blank = CString::new(" ").unwrap();
        let options = WatInitOptions {
            log_filter: blank.as_ptr(),
            ..WatInitOptions::default()
        };
        assert_eq!(wat_init(&options), WatStatus::ConfigError as i32);

        let bad = [0xfeu8 as c_char, 0];
        let options = WatInitOptions {
            log_filter: bad.as_ptr(),
            ..WatInitOptions::default()
        };
        assert_eq!(wat_init(&options), WatStatus::InvalidText as i32);
    }

    #[test]
    fn init_is_idempotent_for_the_config_in_force() {
        let _guard = crate::test_state();
        config::current();
        assert_eq!(wat_init(std::ptr::null()), WatStatus::Ok as i32);
        assert_eq!(wat_init(std::ptr::null()), WatStatus::Ok as i32);

        let options = WatInitOptions {
            array_initial_capacity: 16,
            ..WatInitOptions::default()
        };
        assert_eq!(wat_init(&options), WatStatus::AlreadyInitialized as i32);
    }

    #[test]
    fn close_clears_callbacks() {
        let _guard = crate::test_state();
        wat_register_sign_change_callback(Some(ignore));
        assert!(registry::global().is_registered::<SignChangeEvent>());
        assert_eq!(wat_close(), WatStatus::Ok as i32);
        assert!(!registry::global().is_registered::<SignChangeEvent>());
    }
}
