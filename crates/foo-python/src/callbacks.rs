//! Python objects as core callback implementations
//!
//! The adapter holds a strong reference to the Python object. Releasing the
//! handle drops that reference; when it was the last one the object is
//! finalized by the interpreter.

use pyo3::prelude::*;

use foo_core::{CallbackInterface, OneTimeCallbackInterface};

use crate::convert;

/// Strong reference to a Python callback object
pub struct PyCallback {
    object: PyObject,
}

impl PyCallback {
    pub fn new(object: PyObject) -> Self {
        Self { object }
    }
}

impl CallbackInterface for PyCallback {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        Python::with_gil(|py| {
            let reply = self.object.call_method1(py, "on_value", (value,))?;
            Ok(convert::to_u32(reply.as_ref(py), "on_value reply")?)
        })
    }

    fn on_duration(&self, value: chrono::Duration) -> anyhow::Result<chrono::Duration> {
        Python::with_gil(|py| {
            let argument = convert::to_timedelta(py, value)?;
            let reply = self.object.call_method1(py, "on_duration", (argument,))?;
            Ok(convert::to_duration(reply.as_ref(py), "on_duration reply")?)
        })
    }
}

impl OneTimeCallbackInterface for PyCallback {
    fn on_value(&self, value: u32) -> anyhow::Result<u32> {
        CallbackInterface::on_value(self, value)
    }
}
