//! C functions for the callback source object
//!
//! Callbacks may call these functions on the source that invoked them. Only
//! shared references to the source are formed here, and its memory is freed
//! once no call on it is in progress: a destroy issued from inside a callback
//! frees the source when the outermost call returns.

use foo_core::{value, CallbackSource, InterfaceHandle, OneTimeHandle};

use crate::callbacks::{ForeignInterface, ForeignOneTime, DURATION_UNIT};
use crate::error::{map_core_error, validate_mut_ptr};
use crate::memory::clear_last_error;
use crate::types::{
    FooCallbackInterface, FooCallbackSource, FooOneTimeCallbackInterface, FooResult,
};

unsafe fn source_ref<'a>(
    source: *mut FooCallbackSource,
) -> Result<&'a CallbackSource, FooResult> {
    validate_mut_ptr(source, "source")?;
    Ok(&*(source as *const CallbackSource))
}

/// Free `source` if it was destroyed from inside a callback and the last call
/// on it has now returned
unsafe fn free_if_released(source: *mut FooCallbackSource) {
    let releasable = {
        let source = &*(source as *const CallbackSource);
        source.is_destroyed() && !source.in_foreign_call()
    };

    if releasable {
        drop(Box::from_raw(source as *mut CallbackSource));
    }
}

/// Create a callback source with no registered callback
///
/// # Safety
/// The source must be freed with `foo_callback_source_destroy`
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_new() -> *mut FooCallbackSource {
    clear_last_error();
    Box::into_raw(Box::new(CallbackSource::new())) as *mut FooCallbackSource
}

/// Destroy a callback source, releasing its registered callback
///
/// When called from inside one of the source's callbacks, the release and
/// the free happen once that callback's triggering call returns.
///
/// # Safety
/// The pointer must have been created by `foo_callback_source_new` and must
/// not be used afterwards, except by a triggering call still on the stack.
/// Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_destroy(source: *mut FooCallbackSource) {
    if source.is_null() {
        return;
    }

    (*(source as *const CallbackSource)).destroy();
    free_if_released(source);
}

/// Register the persistent callback, releasing the previous one
///
/// The library owns `callback` from this call on: `on_destroy` runs on
/// replacement, on destroy, or right away if the registration is rejected.
/// Fails with `ReentrantCall` from inside a callback of the same source.
///
/// # Safety
/// `source` must be a live pointer from `foo_callback_source_new`
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_set_interface(
    source: *mut FooCallbackSource,
    callback: FooCallbackInterface,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        let callback = ForeignInterface::new(callback);
        callback.validate()?;
        let cb_source = source_ref(source)?;

        let result = cb_source.set_interface(InterfaceHandle::new(callback));
        free_if_released(source);
        result.map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Release the registered callback, if any
///
/// Fails with `ReentrantCall` from inside a callback of the same source.
///
/// # Safety
/// `source` must be a live pointer from `foo_callback_source_new`
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_clear_interface(
    source: *mut FooCallbackSource,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        let cb_source = source_ref(source)?;

        let result = cb_source.clear_interface();
        free_if_released(source);
        result.map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Dispatch `on_value(value)` and store the reply in `out_value`
///
/// # Safety
/// `source` must be a live pointer from `foo_callback_source_new` and
/// `out_value` must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_set_value(
    source: *mut FooCallbackSource,
    value: u32,
    out_value: *mut u32,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_value, "out_value")?;
        let cb_source = source_ref(source)?;

        let result = cb_source.set_value(value);
        free_if_released(source);
        *out_value = result.map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Dispatch `on_duration(value_ms)` and store the reply in `out_ms`
///
/// # Safety
/// `source` must be a live pointer from `foo_callback_source_new` and
/// `out_ms` must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_set_duration(
    source: *mut FooCallbackSource,
    value_ms: i64,
    out_ms: *mut i64,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_ms, "out_ms")?;
        let cb_source = source_ref(source)?;

        let duration = DURATION_UNIT
            .from_ticks(value_ms)
            .and_then(value::decode_duration)
            .map_err(map_core_error)?;
        let result = cb_source.set_duration(duration);
        free_if_released(source);

        *out_ms = result
            .and_then(value::encode_duration)
            .and_then(|reply| DURATION_UNIT.to_ticks(reply))
            .map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}

/// Invoke a one-time callback with `value` and store the reply in `out_value`
///
/// `callback.on_destroy` runs exactly once before this function returns,
/// whatever the outcome.
///
/// # Safety
/// `source` must be a live pointer from `foo_callback_source_new` and
/// `out_value` must be writable
#[no_mangle]
pub unsafe extern "C" fn foo_callback_source_call_one_time(
    source: *mut FooCallbackSource,
    callback: FooOneTimeCallbackInterface,
    value: u32,
    out_value: *mut u32,
) -> FooResult {
    ffi_boundary!({
        clear_last_error();
        let callback = ForeignOneTime::new(callback);
        validate_mut_ptr(out_value, "out_value")?;
        callback.validate()?;
        let cb_source = source_ref(source)?;

        let result = cb_source.call_one_time(OneTimeHandle::new(callback), value);
        free_if_released(source);
        *out_value = result.map_err(map_core_error)?;
        Ok(FooResult::Success)
    })
}
