//! Library-level functions: version, logging and handle accounting

use std::os::raw::c_char;

use foo_core::LoggingConfig;

use crate::error::{map_core_error, validate_mut_ptr};
use crate::memory::{c_str_to_str, clear_last_error};
use crate::types::FooResult;

/// Get the library version
///
/// # Safety
/// The returned string is static and must NOT be freed
#[no_mangle]
pub unsafe extern "C" fn foo_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Install the global log subscriber
///
/// `config_json` is a JSON logging configuration such as
/// `{"level": "debug", "format": "json"}`; null selects the defaults.
/// `FOO_LOG` and `FOO_LOG_FORMAT` override the document. Calling this again
/// once a subscriber is installed succeeds without effect.
///
/// # Safety
/// `config_json` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn foo_configure_logging(config_json: *const c_char) -> FooResult {
    ffi_boundary!({
        clear_last_error();

        let mut config = if config_json.is_null() {
            LoggingConfig::default()
        } else {
            let json = c_str_to_str(config_json, "config_json")?;
            LoggingConfig::from_json(json).map_err(map_core_error)?
        };
        config.merge_with_env();

        foo_core::logging::init(&config).map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Read the process-wide callback handle counters
///
/// # Safety
/// Both out-parameters must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_handle_stats(
    out_acquired: *mut u64,
    out_released: *mut u64,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_acquired, "out_acquired")?;
        validate_mut_ptr(out_released, "out_released")?;

        let stats = foo_core::handle_stats();
        *out_acquired = stats.acquired;
        *out_released = stats.released;
        Ok(FooResult::Success)
    })
}
