//! Error handling for FFI boundary
//!
//! Errors cross as [`FooResult`] codes with the detail left in the
//! thread-local last-error slot. Panics never unwind into the caller.

use std::any::Any;
use std::panic;

use crate::memory::set_last_error;
use crate::types::FooResult;

/// Convert a core error to an FFI result code
pub fn map_core_error(error: foo_core::Error) -> FooResult {
    use foo_core::Error;

    let code = match &error {
        Error::InvalidValue { .. } => FooResult::InvalidValue,
        Error::NoCallbackRegistered => FooResult::NoCallbackRegistered,
        Error::ObjectDestroyed { .. } => FooResult::ObjectDestroyed,
        Error::Reentrant { .. } => FooResult::ReentrantCall,
        Error::Callback { .. } => FooResult::CallbackFailed,
        Error::Configuration { .. } => FooResult::InvalidConfig,
    };

    set_last_error(error.to_string());
    code
}

/// Safely execute a closure that might panic
///
/// Panics are converted to [`FooResult::InternalError`].
pub fn catch_panic<F, R>(f: F) -> Result<R, FooResult>
where
    F: FnOnce() -> Result<R, FooResult> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            tracing::error!(panic = %msg, "panic caught at FFI boundary");
            set_last_error(format!("Panic occurred: {}", msg));
            Err(FooResult::InternalError)
        }
    }
}

fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for safely executing FFI functions
///
/// The body evaluates to `Result<FooResult, FooResult>`; an error code is
/// returned from the enclosing function.
#[macro_export]
macro_rules! ffi_boundary {
    ($body:expr) => {{
        match $crate::error::catch_panic(|| $body) {
            Ok(result) => result,
            Err(code) => return code,
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &str) -> Result<(), FooResult> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        Err(FooResult::NullPointer)
    } else {
        Ok(())
    }
}

/// Validate that a mutable pointer is not null
pub fn validate_mut_ptr<T>(ptr: *mut T, name: &str) -> Result<(), FooResult> {
    validate_ptr(ptr as *const T, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::foo_get_last_error;
    use std::ffi::CStr;

    #[test]
    fn test_panic_catching() {
        let result = catch_panic(|| {
            panic!("Test panic");
            #[allow(unreachable_code)]
            Ok(42)
        });

        assert_eq!(result.unwrap_err(), FooResult::InternalError);
        let message = unsafe { CStr::from_ptr(foo_get_last_error()) };
        assert!(message.to_str().unwrap().contains("Test panic"));
    }

    #[test]
    fn test_ptr_validation() {
        let value = 42;
        let ptr = &value as *const i32;

        assert!(validate_ptr(ptr, "test_ptr").is_ok());
        assert_eq!(
            validate_ptr(std::ptr::null::<i32>(), "null_ptr").unwrap_err(),
            FooResult::NullPointer
        );
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(
            map_core_error(foo_core::Error::NoCallbackRegistered),
            FooResult::NoCallbackRegistered
        );
        assert_eq!(
            map_core_error(foo_core::Error::invalid_value("negative duration")),
            FooResult::InvalidValue
        );

        let message = unsafe { CStr::from_ptr(foo_get_last_error()) };
        assert!(message.to_str().unwrap().contains("negative duration"));
    }
}
