//! Python wrapper for the callback source

use pyo3::prelude::*;
use pyo3::types::PyType;

use foo_core::{value, CallbackSource, InterfaceHandle, OneTimeHandle};

use crate::callbacks::PyCallback;
use crate::convert;
use crate::error::IntoPyResult;

/// Native object that dispatches into a registered Python callback
///
/// The registered callback is released by `close()`, by leaving a `with`
/// block, or when the object itself is collected, whichever comes first.
/// Callbacks may trigger the source again. Changing the registration from
/// inside a callback raises `ReentrantCallError`; `close()` from inside one
/// takes effect when the outermost call returns.
#[pyclass(name = "CallbackSource", unsendable)]
pub struct PyCallbackSource {
    inner: CallbackSource,
}

#[pymethods]
impl PyCallbackSource {
    #[new]
    fn new() -> Self {
        Self {
            inner: CallbackSource::new(),
        }
    }

    /// Register `callback` (an object with `on_value` and `on_duration`),
    /// releasing any previous one
    fn set_interface(&self, callback: PyObject) -> PyResult<()> {
        self.inner
            .set_interface(InterfaceHandle::new(PyCallback::new(callback)))
            .into_py_result()
    }

    /// Release the registered callback; returns whether one was registered
    fn clear_interface(&self) -> PyResult<bool> {
        self.inner.clear_interface().into_py_result()
    }

    /// Pass `value` to the callback's `on_value` and return its reply
    fn set_value(&self, value: &PyAny) -> PyResult<u32> {
        let value = convert::to_u32(value, "value").into_py_result()?;
        self.inner.set_value(value).into_py_result()
    }

    /// Pass a `timedelta` to the callback's `on_duration` and return its reply
    fn set_duration(&self, py: Python<'_>, value: &PyAny) -> PyResult<PyObject> {
        let span = convert::to_duration(value, "value").into_py_result()?;
        let native = value::decode_duration(span).into_py_result()?;
        let reply = self.inner.set_duration(native).into_py_result()?;
        convert::to_timedelta(py, value::encode_duration(reply).into_py_result()?)
    }

    /// Call `callback.on_value(value)` once, then release `callback`
    fn call_one_time(&self, callback: PyObject, value: &PyAny) -> PyResult<u32> {
        let handle = OneTimeHandle::new(PyCallback::new(callback));
        let value = convert::to_u32(value, "value").into_py_result()?;
        self.inner.call_one_time(handle, value).into_py_result()
    }

    /// Release the registered callback; later calls raise `ObjectDestroyedError`
    fn close(&self) {
        self.inner.destroy();
    }

    /// Whether a callback is registered
    #[getter]
    fn has_interface(&self) -> bool {
        self.inner.has_interface()
    }

    /// Whether `close()` has run
    #[getter]
    fn closed(&self) -> bool {
        self.inner.is_destroyed()
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __exit__(
        &self,
        _exc_type: Option<&PyType>,
        _exc_value: Option<&PyAny>,
        _traceback: Option<&PyAny>,
    ) -> bool {
        self.inner.destroy();
        false
    }

    fn __repr__(&self) -> String {
        format!(
            "CallbackSource(id={}, closed={})",
            self.inner.id(),
            self.inner.is_destroyed()
        )
    }
}
