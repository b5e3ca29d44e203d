//! String echo class
//!
//! The object keeps a copy of the last string it was given and hands back a
//! pointer into that copy.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::{catch_panic, validate_mut_ptr, validate_ptr};
use crate::memory::clear_last_error;
use crate::types::FooString;

#[derive(Default)]
struct StringEcho {
    value: CString,
}

/// Create a string echo object
///
/// # Safety
/// The object must be freed with `foo_string_destroy`
#[no_mangle]
pub unsafe extern "C" fn foo_string_new() -> *mut FooString {
    clear_last_error();
    Box::into_raw(Box::<StringEcho>::default()) as *mut FooString
}

/// Free a string echo object
///
/// # Safety
/// The pointer must have been created by `foo_string_new`. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn foo_string_destroy(string: *mut FooString) {
    if string.is_null() {
        return;
    }

    drop(Box::from_raw(string as *mut StringEcho));
}

/// Store a copy of `value` and return it
///
/// Returns null on error, with the reason in `foo_get_last_error`.
///
/// # Safety
/// `string` must be a live pointer from `foo_string_new` and `value` a valid
/// null-terminated C string. The returned pointer is owned by `string` and
/// stays valid until the next echo or destroy on it.
#[no_mangle]
pub unsafe extern "C" fn foo_string_echo(
    string: *mut FooString,
    value: *const c_char,
) -> *const c_char {
    clear_last_error();

    let result = catch_panic(|| {
        validate_mut_ptr(string, "string")?;
        validate_ptr(value, "value")?;

        let echo = &mut *(string as *mut StringEcho);
        echo.value = CStr::from_ptr(value).to_owned();
        Ok(echo.value.as_ptr())
    });

    result.unwrap_or(ptr::null())
}
