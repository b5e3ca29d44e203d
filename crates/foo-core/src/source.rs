//! The callback source native object
//!
//! A [`CallbackSource`] owns a single persistent callback slot and exposes the
//! trigger operations that dispatch into it. Teardown is explicit through
//! [`CallbackSource::destroy`] and also happens on drop, so the registered
//! handle is released deterministically whichever path runs first.
//!
//! # Reentrancy
//!
//! Callbacks may call back into the source that invoked them. While any
//! foreign code runs on behalf of a source (a dispatch, a one-time call, or a
//! release reaching a foreign destructor), the registered handle stays put:
//! [`set_interface`](CallbackSource::set_interface) and
//! [`clear_interface`](CallbackSource::clear_interface) fail with
//! [`Error::Reentrant`], and [`destroy`](CallbackSource::destroy) marks the
//! source destroyed but defers the release until the outermost foreign call
//! has returned. Trigger operations may nest.
//!
//! # Threading
//!
//! A source is not internally synchronized. Hosts that share one across
//! threads must serialize every call themselves.

use std::cell::{Cell, RefCell, RefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::handle::{CallbackInterface, InterfaceHandle, Method, OneTimeHandle};
use crate::invoker;
use crate::slot::CallbackSlot;
use crate::value::Value;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Destroyed,
}

/// Native object holding one persistent callback
pub struct CallbackSource {
    id: u64,
    state: Cell<State>,
    foreign_calls: Cell<u32>,
    slot: RefCell<CallbackSlot<dyn CallbackInterface>>,
}

/// Counts one foreign call in progress; the count drops on unwind too
struct ForeignCall<'a> {
    depth: &'a Cell<u32>,
}

impl<'a> ForeignCall<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for ForeignCall<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl CallbackSource {
    /// Create a source with an empty slot
    pub fn new() -> Self {
        let id = NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(source = id, "callback source created");

        Self {
            id,
            state: Cell::new(State::Active),
            foreign_calls: Cell::new(0),
            slot: RefCell::new(CallbackSlot::new()),
        }
    }

    /// Identifier used in logs
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Register the persistent callback, releasing any previous one
    ///
    /// Ownership of `handle` passes to the source even when the call fails;
    /// a rejected handle is released before this returns.
    pub fn set_interface(&self, handle: InterfaceHandle) -> Result<()> {
        let idle = self.ensure_idle("set_interface");

        self.call_out(move || {
            self.ensure_active("set_interface")?;
            idle?;
            tracing::debug!(source = self.id, handle = handle.id(), "registering callback");

            let previous = self.slot_mut("set_interface")?.replace(handle);
            if let Some(previous) = previous {
                tracing::debug!(
                    source = self.id,
                    old = previous.id(),
                    "replacing registered callback"
                );
                previous.release();
            }
            Ok(())
        })
    }

    /// Release the registered callback, if any
    pub fn clear_interface(&self) -> Result<bool> {
        self.ensure_active("clear_interface")?;
        self.ensure_idle("clear_interface")?;

        let previous = self.slot_mut("clear_interface")?.take();
        Ok(match previous {
            Some(handle) => {
                self.call_out(|| handle.release());
                true
            }
            None => false,
        })
    }

    /// Whether a persistent callback is registered
    pub fn has_interface(&self) -> bool {
        self.slot.try_borrow().map_or(true, |slot| !slot.is_empty())
    }

    /// Dispatch `on_value(value)` to the registered callback
    pub fn set_value(&self, value: u32) -> Result<u32> {
        self.ensure_active("set_value")?;
        self.dispatch(Method::OnValue, Value::U32(value))?
            .into_u32()
    }

    /// Dispatch `on_duration(value)` to the registered callback
    pub fn set_duration(&self, value: Duration) -> Result<Duration> {
        self.ensure_active("set_duration")?;
        self.dispatch(Method::OnDuration, Value::Duration(value))?
            .into_duration()
    }

    /// Invoke a one-time callback with `value`, bypassing the slot
    ///
    /// The handle is released exactly once whatever the outcome.
    pub fn call_one_time(&self, handle: OneTimeHandle, value: u32) -> Result<u32> {
        self.call_out(move || {
            self.ensure_active("call_one_time")?;
            invoker::call_once(handle, value)
        })
    }

    /// Release the registered callback and make the source unusable
    ///
    /// Never fails. Calling it again is a no-op. From inside a callback the
    /// release waits until the outermost foreign call returns.
    pub fn destroy(&self) {
        if self.state.get() == State::Destroyed {
            tracing::debug!(source = self.id, "callback source already destroyed");
            self.release_if_destroyed();
            return;
        }

        self.state.set(State::Destroyed);
        if self.in_foreign_call() {
            tracing::debug!(source = self.id, "destroyed from a callback, release deferred");
            return;
        }

        let released = self.release_if_destroyed();
        tracing::debug!(source = self.id, released, "callback source destroyed");
    }

    /// Whether [`destroy`](Self::destroy) has run
    pub fn is_destroyed(&self) -> bool {
        self.state.get() == State::Destroyed
    }

    /// Whether foreign code is currently running on behalf of this source
    ///
    /// Bindings that free the source's memory on destroy must wait until
    /// this is `false`.
    pub fn in_foreign_call(&self) -> bool {
        self.foreign_calls.get() > 0
    }

    /// Run `f` as a foreign call, then perform a release deferred by a
    /// destroy issued inside it
    fn call_out<R>(&self, f: impl FnOnce() -> R) -> R {
        let result = {
            let _call = ForeignCall::enter(&self.foreign_calls);
            f()
        };
        self.release_if_destroyed();
        result
    }

    fn release_if_destroyed(&self) -> bool {
        if !self.is_destroyed() || self.in_foreign_call() {
            return false;
        }

        let handle = match self.slot.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match handle {
            Some(handle) => {
                let _call = ForeignCall::enter(&self.foreign_calls);
                handle.release();
                true
            }
            None => false,
        }
    }

    fn ensure_active(&self, operation: &'static str) -> Result<()> {
        match self.state.get() {
            State::Active => Ok(()),
            State::Destroyed => {
                tracing::warn!(
                    source = self.id,
                    operation,
                    "operation on destroyed callback source"
                );
                Err(Error::ObjectDestroyed { operation })
            }
        }
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<()> {
        if self.in_foreign_call() {
            tracing::warn!(source = self.id, operation, "mutation from inside a callback rejected");
            return Err(Error::Reentrant { operation });
        }
        Ok(())
    }

    fn slot_mut(
        &self,
        operation: &'static str,
    ) -> Result<RefMut<'_, CallbackSlot<dyn CallbackInterface>>> {
        self.slot
            .try_borrow_mut()
            .map_err(|_| Error::Reentrant { operation })
    }

    fn dispatch(&self, method: Method, arg: Value) -> Result<Value> {
        self.call_out(|| {
            let slot = self
                .slot
                .try_borrow()
                .map_err(|_| Error::Reentrant { operation: method.name() })?;
            let handle = slot.get().ok_or_else(|| {
                tracing::warn!(source = self.id, %method, "no callback registered");
                Error::NoCallbackRegistered
            })?;
            handle.invoke(method, arg)
        })
    }
}

impl Default for CallbackSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CallbackSource {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Counters, Recorder};
    use std::rc::Rc;

    #[test]
    fn test_interface_and_one_time_callback() {
        let counters = Rc::new(Counters::default());
        let source = CallbackSource::new();
        source.set_interface(InterfaceHandle::new(Recorder::new(&counters))).unwrap();

        assert_eq!(counters.last_value.get(), None);
        assert_eq!(source.set_value(76).unwrap(), 76);
        assert_eq!(counters.last_value.get(), Some(76));

        assert_eq!(counters.last_duration.get(), None);
        assert_eq!(
            source.set_duration(Duration::from_secs(76)).unwrap(),
            Duration::from_secs(76)
        );
        assert_eq!(counters.last_duration.get(), Some(chrono::Duration::seconds(76)));

        let one_time = Rc::new(Counters::default());
        assert_eq!(
            source.call_one_time(OneTimeHandle::new(Recorder::new(&one_time)), 76).unwrap(),
            76
        );
        assert_eq!(one_time.last_value.get(), Some(76));
        assert_eq!(one_time.released.get(), 1);
        assert!(source.has_interface());
    }

    #[test]
    fn test_no_callback_registered() {
        let source = CallbackSource::new();
        assert!(matches!(source.set_value(1), Err(Error::NoCallbackRegistered)));
        assert!(matches!(
            source.set_duration(Duration::from_millis(1)),
            Err(Error::NoCallbackRegistered)
        ));
    }

    #[test]
    fn test_destroy_releases_once() {
        let counters = Rc::new(Counters::default());
        let source = CallbackSource::new();
        source.set_interface(InterfaceHandle::new(Recorder::new(&counters))).unwrap();

        source.destroy();
        assert_eq!(counters.released.get(), 1);
        assert!(source.is_destroyed());

        source.destroy();
        drop(source);
        assert_eq!(counters.released.get(), 1);
    }

    #[test]
    fn test_operations_after_destroy() {
        let counters = Rc::new(Counters::default());
        let source = CallbackSource::new();
        source.destroy();

        assert!(matches!(source.set_value(1), Err(Error::ObjectDestroyed { .. })));
        assert!(matches!(source.clear_interface(), Err(Error::ObjectDestroyed { .. })));

        let err = source
            .set_interface(InterfaceHandle::new(Recorder::new(&counters)))
            .unwrap_err();
        assert!(matches!(err, Error::ObjectDestroyed { operation: "set_interface" }));
        assert_eq!(counters.released.get(), 1);

        let err = source
            .call_one_time(OneTimeHandle::new(Recorder::new(&counters)), 3)
            .unwrap_err();
        assert!(matches!(err, Error::ObjectDestroyed { .. }));
        assert_eq!(counters.calls.get(), 0);
        assert_eq!(counters.released.get(), 2);
    }

    #[test]
    fn test_clear_interface() {
        let counters = Rc::new(Counters::default());
        let source = CallbackSource::new();
        source.set_interface(InterfaceHandle::new(Recorder::new(&counters))).unwrap();

        assert!(source.clear_interface().unwrap());
        assert!(!source.has_interface());
        assert_eq!(counters.released.get(), 1);
        assert!(matches!(source.set_value(1), Err(Error::NoCallbackRegistered)));
    }

    #[test]
    fn test_callback_failure_keeps_registration() {
        let counters = Rc::new(Counters::default());
        let source = CallbackSource::new();
        source.set_interface(InterfaceHandle::new(Recorder::failing(&counters))).unwrap();

        assert!(matches!(source.set_value(9), Err(Error::Callback { .. })));
        assert!(source.has_interface());
        assert_eq!(counters.released.get(), 0);
    }

    mod reentrancy {
        use super::*;
        use std::rc::Weak;

        #[derive(Clone, Copy)]
        enum Reentry {
            Clear,
            Replace,
            Destroy,
            Nest,
        }

        /// What a reentering callback observed while it was running
        #[derive(Default)]
        struct Trace {
            outcome: Cell<Option<&'static str>>,
            released_in_call: Cell<Option<u32>>,
        }

        struct Reentering {
            source: Weak<CallbackSource>,
            reentry: Reentry,
            counters: Rc<Counters>,
            spare: Rc<Counters>,
            trace: Rc<Trace>,
        }

        impl CallbackInterface for Reentering {
            fn on_value(&self, value: u32) -> anyhow::Result<u32> {
                self.counters.calls.set(self.counters.calls.get() + 1);
                let source = self
                    .source
                    .upgrade()
                    .ok_or_else(|| anyhow::anyhow!("source dropped"))?;

                let outcome = match self.reentry {
                    Reentry::Clear => source.clear_interface().map(|_| ()),
                    Reentry::Replace => {
                        source.set_interface(InterfaceHandle::new(Recorder::new(&self.spare)))
                    }
                    Reentry::Destroy => {
                        source.destroy();
                        Ok(())
                    }
                    Reentry::Nest if value > 0 => source.set_value(value - 1).map(|_| ()),
                    Reentry::Nest => Ok(()),
                };

                self.trace
                    .outcome
                    .set(Some(outcome.map_or_else(|e| e.kind(), |_| "ok")));
                self.trace.released_in_call.set(Some(self.counters.released.get()));
                Ok(value)
            }

            fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
                Ok(value)
            }
        }

        impl Drop for Reentering {
            fn drop(&mut self) {
                self.counters.released.set(self.counters.released.get() + 1);
            }
        }

        struct Fixture {
            source: Rc<CallbackSource>,
            counters: Rc<Counters>,
            spare: Rc<Counters>,
            trace: Rc<Trace>,
        }

        fn register(reentry: Reentry) -> Fixture {
            let fixture = Fixture {
                source: Rc::new(CallbackSource::new()),
                counters: Rc::new(Counters::default()),
                spare: Rc::new(Counters::default()),
                trace: Rc::new(Trace::default()),
            };
            let callback = Reentering {
                source: Rc::downgrade(&fixture.source),
                reentry,
                counters: Rc::clone(&fixture.counters),
                spare: Rc::clone(&fixture.spare),
                trace: Rc::clone(&fixture.trace),
            };
            fixture
                .source
                .set_interface(InterfaceHandle::new(callback))
                .unwrap();
            fixture
        }

        #[test]
        fn test_clear_from_callback_rejected() {
            let f = register(Reentry::Clear);

            assert_eq!(f.source.set_value(7).unwrap(), 7);
            assert_eq!(f.trace.outcome.get(), Some("Reentrant"));
            assert_eq!(f.trace.released_in_call.get(), Some(0));
            assert_eq!(f.counters.released.get(), 0);
            assert!(f.source.has_interface());
            assert!(!f.source.in_foreign_call());
        }

        #[test]
        fn test_replace_from_callback_rejected() {
            let f = register(Reentry::Replace);

            assert_eq!(f.source.set_value(7).unwrap(), 7);
            assert_eq!(f.trace.outcome.get(), Some("Reentrant"));
            assert_eq!(f.counters.released.get(), 0);
            // The rejected handle was still released
            assert_eq!(f.spare.constructed.get(), 1);
            assert_eq!(f.spare.released.get(), 1);
            assert_eq!(f.spare.calls.get(), 0);
        }

        #[test]
        fn test_destroy_from_callback_is_deferred() {
            let f = register(Reentry::Destroy);

            assert_eq!(f.source.set_value(3).unwrap(), 3);
            assert_eq!(f.trace.outcome.get(), Some("ok"));
            assert_eq!(f.trace.released_in_call.get(), Some(0));
            assert_eq!(f.counters.released.get(), 1);
            assert!(f.source.is_destroyed());
            assert!(!f.source.has_interface());
            assert!(matches!(f.source.set_value(1), Err(Error::ObjectDestroyed { .. })));
        }

        #[test]
        fn test_nested_dispatch_allowed() {
            let f = register(Reentry::Nest);

            assert_eq!(f.source.set_value(2).unwrap(), 2);
            assert_eq!(f.counters.calls.get(), 3);
            assert_eq!(f.trace.outcome.get(), Some("ok"));
            assert_eq!(f.counters.released.get(), 0);
        }

        #[test]
        fn test_destroy_from_release_of_replaced_handle() {
            struct DestroyOnRelease(Weak<CallbackSource>);

            impl CallbackInterface for DestroyOnRelease {
                fn on_value(&self, value: u32) -> anyhow::Result<u32> {
                    Ok(value)
                }

                fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
                    Ok(value)
                }
            }

            impl Drop for DestroyOnRelease {
                fn drop(&mut self) {
                    if let Some(source) = self.0.upgrade() {
                        source.destroy();
                    }
                }
            }

            let source = Rc::new(CallbackSource::new());
            let next = Rc::new(Counters::default());
            source
                .set_interface(InterfaceHandle::new(DestroyOnRelease(Rc::downgrade(&source))))
                .unwrap();

            source.set_interface(InterfaceHandle::new(Recorder::new(&next))).unwrap();

            assert!(source.is_destroyed());
            assert_eq!(next.released.get(), 1);
            assert!(!source.has_interface());
        }
    }
}
