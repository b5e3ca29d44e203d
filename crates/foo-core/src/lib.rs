//! Foo Core - callback registration and dispatch across a language boundary
//!
//! This crate provides the mechanism the foo bindings are built on: a native
//! object that holds a reference to a foreign callback implementation,
//! dispatches into it synchronously, and releases it deterministically.
//!
//! # Main Components
//!
//! - **Value Codec** ([`value`]): native/foreign conversion of `u32` and duration values
//! - **Callback Handle** ([`handle`]): ownership-tracked reference to one foreign implementation
//! - **Callback Slot** ([`slot`]): holder for zero or one handle with replace-with-release
//! - **One-Time Invoker** ([`invoker`]): invoke exactly once, then release
//! - **Callback Source** ([`source`]): the native object tying it all together
//!
//! # Example
//!
//! ```
//! use foo_core::{CallbackInterface, CallbackSource, InterfaceHandle, Result};
//!
//! struct Echo;
//!
//! impl CallbackInterface for Echo {
//!     fn on_value(&self, value: u32) -> anyhow::Result<u32> {
//!         Ok(value)
//!     }
//!
//!     fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
//!         Ok(value)
//!     }
//! }
//!
//! fn example() -> Result<()> {
//!     let source = CallbackSource::new();
//!     source.set_interface(InterfaceHandle::new(Echo))?;
//!     assert_eq!(source.set_value(76)?, 76);
//!     source.destroy();
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod invoker;
pub mod logging;
pub mod slot;
pub mod source;
pub mod value;

mod test_support;

// Re-export main types for convenience
pub use config::{LogFormat, LoggingConfig};
pub use error::{Error, Result};
pub use handle::{
    handle_stats, CallbackHandle, CallbackInterface, Dispatch, HandleStats, InterfaceHandle,
    Method, OneTimeCallbackInterface, OneTimeHandle,
};
pub use invoker::call_once;
pub use slot::CallbackSlot;
pub use source::CallbackSource;
pub use value::{DurationUnit, ForeignValue, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
