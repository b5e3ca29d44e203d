//! Adapters from C dispatch tables to the core callback traits
//!
//! An adapter takes ownership of the table as soon as it is built. Its `Drop`
//! calls `on_destroy(ctx)`, so the C side sees exactly one release whether
//! the adapter ends up registered, consumed by a one-time call, or rejected
//! before it reaches the core.

use anyhow::anyhow;
use foo_core::DurationUnit;

use crate::memory::set_last_error;
use crate::types::{FooCallbackInterface, FooOneTimeCallbackInterface, FooResult};

/// Tick unit for durations crossing the C boundary
pub(crate) const DURATION_UNIT: DurationUnit = DurationUnit::Milliseconds;

/// Owned [`FooCallbackInterface`]
pub(crate) struct ForeignInterface {
    table: FooCallbackInterface,
}

impl ForeignInterface {
    pub(crate) fn new(table: FooCallbackInterface) -> Self {
        Self { table }
    }

    /// Reject tables with a missing method pointer
    pub(crate) fn validate(&self) -> Result<(), FooResult> {
        if self.table.on_value.is_none() {
            return Err(missing("callback.on_value"));
        }
        if self.table.on_duration.is_none() {
            return Err(missing("callback.on_duration"));
        }
        Ok(())
    }
}

impl foo_core::CallbackInterface for ForeignInterface {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        let on_value = self.table.on_value.ok_or_else(|| anyhow!("on_value is null"))?;
        Ok(on_value(value, self.table.ctx))
    }

    fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
        let on_duration = self
            .table
            .on_duration
            .ok_or_else(|| anyhow!("on_duration is null"))?;
        let ticks = DURATION_UNIT.to_ticks(value)?;
        let reply = on_duration(ticks, self.table.ctx);
        Ok(DURATION_UNIT.from_ticks(reply)?)
    }
}

impl Drop for ForeignInterface {
    fn drop(&mut self) {
        if let Some(on_destroy) = self.table.on_destroy {
            on_destroy(self.table.ctx);
        }
    }
}

/// Owned [`FooOneTimeCallbackInterface`]
pub(crate) struct ForeignOneTime {
    table: FooOneTimeCallbackInterface,
}

impl ForeignOneTime {
    pub(crate) fn new(table: FooOneTimeCallbackInterface) -> Self {
        Self { table }
    }

    /// Reject tables with a missing method pointer
    pub(crate) fn validate(&self) -> Result<(), FooResult> {
        if self.table.on_value.is_none() {
            return Err(missing("callback.on_value"));
        }
        Ok(())
    }
}

impl foo_core::OneTimeCallbackInterface for ForeignOneTime {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        let on_value = self.table.on_value.ok_or_else(|| anyhow!("on_value is null"))?;
        Ok(on_value(value, self.table.ctx))
    }
}

impl Drop for ForeignOneTime {
    fn drop(&mut self) {
        if let Some(on_destroy) = self.table.on_destroy {
            on_destroy(self.table.ctx);
        }
    }
}

fn missing(name: &str) -> FooResult {
    set_last_error(format!("{} is null", name));
    FooResult::NullPointer
}
