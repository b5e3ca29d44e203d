//! One-time invocation
//!
//! [`call_once`] consumes the handle it is given, so the implementation can
//! be dispatched at most once and can never be reached again afterwards.

use crate::error::Result;
use crate::handle::{CallbackHandle, Dispatch, Method};
use crate::value::Value;

/// Invoke `on_value(value)` on `handle` exactly once, then release it
///
/// The handle is released before the outcome is returned, including when the
/// dispatch failed. If the implementation panics, unwinding drops the handle
/// and the release still happens.
pub fn call_once<C: ?Sized + Dispatch>(handle: CallbackHandle<C>, value: u32) -> Result<u32> {
    let id = handle.id();
    let outcome = handle.invoke(Method::OnValue, Value::U32(value));
    handle.release();

    tracing::trace!(handle = id, success = outcome.is_ok(), "one-time callback completed");
    outcome?.into_u32()
}
