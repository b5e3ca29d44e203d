//! Thread-local error reporting and string helpers for the FFI boundary

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::types::FooResult;

// Thread-local storage for last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
pub fn set_last_error<S: Into<String>>(err: S) {
    let mut message = err.into();
    message.retain(|c| c != '\0');
    let error_string = CString::new(message).unwrap_or_default();

    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(error_string);
    });
}

/// Clear the last error message
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Borrow a C string as UTF-8
///
/// # Safety
/// The pointer must be a valid null-terminated C string that outlives `'a`
pub unsafe fn c_str_to_str<'a>(s: *const c_char, name: &str) -> Result<&'a str, FooResult> {
    if s.is_null() {
        set_last_error(format!("{} is null", name));
        return Err(FooResult::NullPointer);
    }

    CStr::from_ptr(s).to_str().map_err(|_| {
        set_last_error(format!("{} is not valid UTF-8", name));
        FooResult::Utf8Error
    })
}

/// Get the last error message
///
/// # Safety
/// Returns a pointer that should NOT be freed by the caller. It stays valid
/// until the next call into the library on the same thread.
#[no_mangle]
pub unsafe extern "C" fn foo_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn foo_clear_error() {
    clear_last_error();
}
