//! Foo Python Bindings
//!
//! This crate exposes the foo callback source to Python using PyO3. Any
//! object with the right methods can be registered as a callback; the
//! binding keeps it alive exactly as long as the native side holds it.

#![allow(non_local_definitions)] // PyO3 macros generate non-local impl blocks

use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::wrap_pyfunction;

mod callbacks;
mod convert;
mod error;
mod source;

use error::*;
use foo_core::{LogFormat, LoggingConfig};
use source::PyCallbackSource;

/// Foo Python module
#[pymodule]
fn foo(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add("FooError", py.get_type::<FooError>())?;
    m.add("InvalidValueError", py.get_type::<InvalidValueError>())?;
    m.add("NoCallbackRegisteredError", py.get_type::<NoCallbackRegisteredError>())?;
    m.add("ObjectDestroyedError", py.get_type::<ObjectDestroyedError>())?;
    m.add("ReentrantCallError", py.get_type::<ReentrantCallError>())?;
    m.add("CallbackError", py.get_type::<CallbackError>())?;

    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(handle_stats, m)?)?;
    m.add_function(wrap_pyfunction!(configure_logging, m)?)?;

    m.add_class::<PyCallbackSource>()?;

    m.add("__version__", foo_core::VERSION)?;
    Ok(())
}

/// Get the version of the foo library
#[pyfunction]
fn version() -> &'static str {
    foo_core::VERSION
}

/// Process-wide callback handle counters
///
/// Returns a dict with `acquired`, `released` and `live`.
#[pyfunction]
fn handle_stats(py: Python<'_>) -> PyResult<&PyDict> {
    let stats = foo_core::handle_stats();
    let dict = PyDict::new(py);
    dict.set_item("acquired", stats.acquired)?;
    dict.set_item("released", stats.released)?;
    dict.set_item("live", stats.live())?;
    Ok(dict)
}

/// Install the log subscriber (output goes to stderr)
///
/// `FOO_LOG` and `FOO_LOG_FORMAT` override the arguments. Returns False if a
/// subscriber was already installed.
#[pyfunction]
#[pyo3(signature = (level="info", format="compact"))]
fn configure_logging(level: &str, format: &str) -> PyResult<bool> {
    let format: LogFormat = format.parse().into_py_result()?;
    let mut config = LoggingConfig {
        level: level.to_string(),
        format,
        ..LoggingConfig::default()
    };
    config.merge_with_env();

    foo_core::logging::init(&config).into_py_result()
}
