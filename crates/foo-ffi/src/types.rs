//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility.

use std::os::raw::c_void;

/// Result codes for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooResult {
    /// Operation completed successfully
    Success = 0,
    /// A value could not be represented on the other side of the boundary
    InvalidValue = -1,
    /// A trigger operation found no registered callback
    NoCallbackRegistered = -2,
    /// The native object was already destroyed
    ObjectDestroyed = -3,
    /// The foreign callback reported a failure
    CallbackFailed = -4,
    /// Invalid logging configuration
    InvalidConfig = -5,
    /// Null pointer provided
    NullPointer = -6,
    /// Invalid UTF-8 string
    Utf8Error = -7,
    /// Registration changed from inside one of the source's own callbacks
    ReentrantCall = -8,
    /// Internal error, including a caught panic
    InternalError = -9,
}

impl FooResult {
    /// Check if the result indicates success
    pub fn is_success(self) -> bool {
        self == FooResult::Success
    }

    /// Get a human-readable error message
    pub fn error_message(self) -> &'static str {
        match self {
            FooResult::Success => "Success",
            FooResult::InvalidValue => "Invalid value",
            FooResult::NoCallbackRegistered => "No callback registered",
            FooResult::ObjectDestroyed => "Object destroyed",
            FooResult::CallbackFailed => "Callback failed",
            FooResult::InvalidConfig => "Invalid configuration",
            FooResult::NullPointer => "Null pointer provided",
            FooResult::Utf8Error => "Invalid UTF-8 string",
            FooResult::ReentrantCall => "Reentrant call",
            FooResult::InternalError => "Internal error",
        }
    }
}

/// Opaque handle for a callback source
#[repr(C)]
pub struct FooCallbackSource {
    _private: [u8; 0],
}

/// Opaque handle for the string echo class
#[repr(C)]
pub struct FooString {
    _private: [u8; 0],
}

/// Persistent callback implemented on the C side
///
/// Durations cross the boundary as non-negative millisecond counts.
/// Ownership of `ctx` passes to the library with the call that receives the
/// struct; `on_destroy(ctx)` runs exactly once when the library lets go of it.
#[repr(C)]
pub struct FooCallbackInterface {
    /// Receives a value, returns the reply
    pub on_value: Option<extern "C" fn(value: u32, ctx: *mut c_void) -> u32>,
    /// Receives a duration in milliseconds, returns the reply in milliseconds
    pub on_duration: Option<extern "C" fn(value: i64, ctx: *mut c_void) -> i64>,
    /// Releases `ctx`
    pub on_destroy: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Caller state handed back to every function above
    pub ctx: *mut c_void,
}

/// One-time callback implemented on the C side
#[repr(C)]
pub struct FooOneTimeCallbackInterface {
    /// Receives a value, returns the reply
    pub on_value: Option<extern "C" fn(value: u32, ctx: *mut c_void) -> u32>,
    /// Releases `ctx`
    pub on_destroy: Option<extern "C" fn(ctx: *mut c_void)>,
    /// Caller state handed back to every function above
    pub ctx: *mut c_void,
}
