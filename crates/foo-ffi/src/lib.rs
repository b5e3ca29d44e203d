//! Foo FFI - C ABI for the foo callback bindings
//!
//! This crate exposes [`foo_core`] through `extern "C"` functions so that
//! generated bindings can register callbacks implemented in their own
//! language. The header is generated into `include/foo.h` at build time.
//!
//! # Safety
//!
//! All FFI functions are marked `unsafe` as they deal with raw pointers
//! and cross-language boundaries. Users must ensure:
//! - Objects are freed exactly once through their `_destroy` function
//! - Non-null pointers where required
//! - Calls on one callback source are serialized
//!
//! Callback tables passed to the library are owned by it from that call on;
//! `on_destroy(ctx)` reports the release.
//!
//! A callback may call back into the source that invoked it. Trigger calls
//! (`set_value`, `set_duration`, `call_one_time`) nest. Changing the
//! registration from inside a callback fails with
//! [`FooResult::ReentrantCall`] and leaves the running callback registered.
//! `foo_callback_source_destroy` from inside a callback is deferred: the
//! callback is released and the source freed when the outermost call on it
//! returns, and the pointer must not be used after that call.

#![warn(missing_docs)]

#[macro_use]
mod error;
mod api;
mod callback_source;
mod callbacks;
mod duration;
mod memory;
mod strings;
mod types;

// Re-export public API
pub use api::*;
pub use callback_source::*;
pub use duration::*;
pub use memory::{foo_clear_error, foo_get_last_error};
pub use strings::*;
pub use types::{
    FooCallbackInterface, FooCallbackSource, FooOneTimeCallbackInterface, FooResult, FooString,
};
