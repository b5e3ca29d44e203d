//! Recording callbacks shared by the unit tests

#![cfg(test)]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::bail;

use crate::handle::{CallbackInterface, OneTimeCallbackInterface};

/// Observations recorded by [`Recorder`] instances
#[derive(Debug, Default)]
pub struct Counters {
    pub constructed: Cell<u32>,
    pub released: Cell<u32>,
    pub calls: Cell<u32>,
    pub last_value: Cell<Option<u32>>,
    pub last_duration: Cell<Option<chrono::Duration>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Echo,
    Fail,
    Negate,
}

/// Echoing callback implementation that reports into shared counters
pub struct Recorder {
    counters: Rc<Counters>,
    behavior: Behavior,
}

impl Recorder {
    pub fn new(counters: &Rc<Counters>) -> Self {
        Self::with_behavior(counters, Behavior::Echo)
    }

    /// Every call fails
    pub fn failing(counters: &Rc<Counters>) -> Self {
        Self::with_behavior(counters, Behavior::Fail)
    }

    /// Durations come back negated
    pub fn negating(counters: &Rc<Counters>) -> Self {
        Self::with_behavior(counters, Behavior::Negate)
    }

    fn with_behavior(counters: &Rc<Counters>, behavior: Behavior) -> Self {
        counters.constructed.set(counters.constructed.get() + 1);
        Self {
            counters: Rc::clone(counters),
            behavior,
        }
    }

    fn record_value(&self, value: u32) -> anyhow::Result<u32> {
        self.counters.calls.set(self.counters.calls.get() + 1);
        if self.behavior == Behavior::Fail {
            bail!("recorder refused {}", value);
        }
        self.counters.last_value.set(Some(value));
        Ok(value)
    }
}

impl CallbackInterface for Recorder {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        self.record_value(value)
    }

    fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
        self.counters.calls.set(self.counters.calls.get() + 1);
        match self.behavior {
            Behavior::Fail => bail!("recorder refused duration"),
            Behavior::Negate => Ok(-value),
            Behavior::Echo => {
                self.counters.last_duration.set(Some(value));
                Ok(value)
            }
        }
    }
}

impl OneTimeCallbackInterface for Recorder {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        self.record_value(value)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.counters.released.set(self.counters.released.get() + 1);
    }
}
