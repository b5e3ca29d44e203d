//! Duration echo functions
//!
//! Each call decodes a tick count into a native duration and encodes it back,
//! so bindings can check their duration mapping against the native codec.

use foo_core::{value, DurationUnit};

use crate::error::{map_core_error, validate_mut_ptr};
use crate::memory::clear_last_error;
use crate::types::FooResult;

fn echo(unit: DurationUnit, ticks: i64) -> foo_core::Result<i64> {
    let native = value::decode_duration(unit.from_ticks(ticks)?)?;
    unit.to_ticks(value::encode_duration(native)?)
}

/// Echo a duration expressed in milliseconds
///
/// # Safety
/// `out_value` must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_duration_ms_echo(value: i64, out_value: *mut i64) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_value, "out_value")?;
        *out_value = echo(DurationUnit::Milliseconds, value).map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Echo a duration expressed in seconds
///
/// # Safety
/// `out_value` must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_duration_s_echo(value: i64, out_value: *mut i64) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_value, "out_value")?;
        *out_value = echo(DurationUnit::Seconds, value).map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}
