//! Callback handles
//!
//! A [`CallbackHandle`] owns exactly one foreign callback implementation.
//! Ownership moves with the handle: whoever holds it is the only party able to
//! dispatch through it, and dropping it is the release. Because
//! [`CallbackHandle::release`] consumes the handle, releasing twice cannot be
//! expressed.
//!
//! Foreign bindings plug in by implementing [`CallbackInterface`] (the
//! persistent role) or [`OneTimeCallbackInterface`] on an adapter type whose
//! own `Drop` performs the foreign-side cleanup, e.g. calling a registered
//! destroy function or dropping a reference into a garbage-collected heap.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::value::{self, ForeignValue, Value};

/// Persistent callback role, held by a callback source between calls
pub trait CallbackInterface {
    /// Handle an integer value and produce the reply
    fn on_value(&self, value: u32) -> anyhow::Result<u32>;

    /// Handle a time span and produce the reply
    fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration>;
}

/// Callback role that is invoked once and then released
pub trait OneTimeCallbackInterface {
    /// Handle an integer value and produce the reply
    fn on_value(&self, value: u32) -> anyhow::Result<u32>;
}

/// Callback methods that can be dispatched through a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `on_value(u32) -> u32`
    OnValue,
    /// `on_duration(duration) -> duration`
    OnDuration,
}

impl Method {
    /// Name of the method as declared on the foreign interface
    pub fn name(self) -> &'static str {
        match self {
            Method::OnValue => "on_value",
            Method::OnDuration => "on_duration",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed dispatch table of a callback role
pub trait Dispatch {
    /// Role name used in logs
    const ROLE: &'static str;

    /// Call `method` on the implementation with a foreign argument
    fn dispatch(&self, method: Method, arg: ForeignValue) -> Result<ForeignValue>;
}

impl Dispatch for dyn CallbackInterface {
    const ROLE: &'static str = "interface";

    fn dispatch(&self, method: Method, arg: ForeignValue) -> Result<ForeignValue> {
        let result = match (method, arg) {
            (Method::OnValue, ForeignValue::U32(v)) => self.on_value(v).map(ForeignValue::U32),
            (Method::OnDuration, ForeignValue::Duration(d)) => {
                self.on_duration(d).map(ForeignValue::Duration)
            }
            (method, arg) => return Err(argument_mismatch(method, &arg)),
        };
        result.map_err(|source| foreign_failure(method, source))
    }
}

impl Dispatch for dyn OneTimeCallbackInterface {
    const ROLE: &'static str = "one_time";

    fn dispatch(&self, method: Method, arg: ForeignValue) -> Result<ForeignValue> {
        match (method, arg) {
            (Method::OnValue, ForeignValue::U32(v)) => self
                .on_value(v)
                .map(ForeignValue::U32)
                .map_err(|source| foreign_failure(method, source)),
            (method, arg) => Err(argument_mismatch(method, &arg)),
        }
    }
}

/// Adapters may report core errors (codec failures on their side of the
/// boundary) through `anyhow`; those keep their kind.
fn foreign_failure(method: Method, source: anyhow::Error) -> Error {
    match source.downcast::<Error>() {
        Ok(err) => err,
        Err(source) => Error::Callback { method, source },
    }
}

fn argument_mismatch(method: Method, arg: &ForeignValue) -> Error {
    Error::invalid_value(format!("{} does not accept a {} argument", method, arg.kind()))
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);
static ACQUIRED: AtomicU64 = AtomicU64::new(0);
static RELEASED: AtomicU64 = AtomicU64::new(0);

/// Owning reference to one foreign callback implementation
pub struct CallbackHandle<C: ?Sized> {
    id: u64,
    role: &'static str,
    inner: Box<C>,
}

/// Handle for the persistent callback role
pub type InterfaceHandle = CallbackHandle<dyn CallbackInterface>;

/// Handle for the one-time callback role
pub type OneTimeHandle = CallbackHandle<dyn OneTimeCallbackInterface>;

impl<C: ?Sized + Dispatch> CallbackHandle<C> {
    /// Take ownership of an implementation
    pub fn acquire(inner: Box<C>) -> Self {
        let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
        ACQUIRED.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(handle = id, role = C::ROLE, "callback handle acquired");

        Self {
            id,
            role: C::ROLE,
            inner,
        }
    }

    /// Synchronously dispatch `method` with `arg`, running the value codec
    /// on the way out and on the way back
    pub fn invoke(&self, method: Method, arg: Value) -> Result<Value> {
        let foreign = value::encode(arg)?;
        tracing::trace!(handle = self.id, role = self.role, %method, "dispatching callback");
        let reply = self.inner.dispatch(method, foreign)?;
        value::decode(reply)
    }
}

impl<C: ?Sized> CallbackHandle<C> {
    /// Process-unique identifier of this handle
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Release the implementation
    ///
    /// Equivalent to dropping the handle; provided so call sites can make the
    /// release point explicit.
    pub fn release(self) {
        drop(self);
    }
}

impl InterfaceHandle {
    /// Acquire a persistent callback implementation
    pub fn new<T: CallbackInterface + 'static>(implementation: T) -> Self {
        Self::acquire(Box::new(implementation))
    }
}

impl OneTimeHandle {
    /// Acquire a one-time callback implementation
    pub fn new<T: OneTimeCallbackInterface + 'static>(implementation: T) -> Self {
        Self::acquire(Box::new(implementation))
    }
}

impl<C: ?Sized> Drop for CallbackHandle<C> {
    fn drop(&mut self) {
        RELEASED.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(handle = self.id, role = self.role, "callback handle released");
        // `inner` is dropped right after this, running the foreign cleanup
    }
}

impl<C: ?Sized> fmt::Debug for CallbackHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("id", &self.id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Process-wide handle accounting, measured at the core boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleStats {
    /// Handles acquired since process start
    pub acquired: u64,
    /// Handles released since process start
    pub released: u64,
}

impl HandleStats {
    /// Handles acquired but not yet released
    pub fn live(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Snapshot the handle counters
pub fn handle_stats() -> HandleStats {
    let released = RELEASED.load(Ordering::SeqCst);
    let acquired = ACQUIRED.load(Ordering::SeqCst);
    HandleStats { acquired, released }
}
