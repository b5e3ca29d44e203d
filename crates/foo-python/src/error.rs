//! Error handling for Python bindings
//!
//! Core errors become exceptions deriving from `FooError`. An exception
//! raised inside a Python callback is handed back unchanged.

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;

use foo_core::Error;

create_exception!(foo, FooError, PyException);
create_exception!(foo, InvalidValueError, FooError);
create_exception!(foo, NoCallbackRegisteredError, FooError);
create_exception!(foo, ObjectDestroyedError, FooError);
create_exception!(foo, ReentrantCallError, FooError);
create_exception!(foo, CallbackError, FooError);

/// Convert a core error to a Python exception
pub fn to_py_err(error: Error) -> PyErr {
    let message = error.to_string();

    match error {
        Error::InvalidValue { .. } => InvalidValueError::new_err(message),
        Error::NoCallbackRegistered => NoCallbackRegisteredError::new_err(message),
        Error::ObjectDestroyed { .. } => ObjectDestroyedError::new_err(message),
        Error::Reentrant { .. } => ReentrantCallError::new_err(message),
        Error::Callback { source, .. } => match source.downcast::<PyErr>() {
            Ok(raised) => raised,
            Err(other) => CallbackError::new_err(format!("{:#}", other)),
        },
        Error::Configuration { .. } => PyValueError::new_err(message),
    }
}

/// Extension for core results
pub trait IntoPyResult<T> {
    /// Map the error with [`to_py_err`]
    fn into_py_result(self) -> PyResult<T>;
}

impl<T> IntoPyResult<T> for foo_core::Result<T> {
    fn into_py_result(self) -> PyResult<T> {
        self.map_err(to_py_err)
    }
}
