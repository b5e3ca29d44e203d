//! Conversions between Python objects and core values
//!
//! `datetime.timedelta` is converted through its `days`, `seconds` and
//! `microseconds` attributes so the module works under the stable ABI.

use pyo3::prelude::*;

use foo_core::Error;

const MICROS_PER_SECOND: i128 = 1_000_000;
const SECONDS_PER_DAY: i128 = 86_400;

/// Extract an unsigned 32-bit value
pub fn to_u32(value: &PyAny, what: &str) -> foo_core::Result<u32> {
    value.extract::<u32>().map_err(|_| {
        Error::invalid_value(format!(
            "{} must be an integer in 0..=4294967295, got {}",
            what,
            describe(value)
        ))
    })
}

/// Convert a `datetime.timedelta` to a signed span
pub fn to_duration(value: &PyAny, what: &str) -> foo_core::Result<chrono::Duration> {
    let field = |name: &str| -> foo_core::Result<i128> {
        value
            .getattr(name)
            .and_then(|v| v.extract::<i64>())
            .map(i128::from)
            .map_err(|_| {
                Error::invalid_value(format!(
                    "{} must be a datetime.timedelta, got {}",
                    what,
                    describe(value)
                ))
            })
    };

    let micros = (field("days")? * SECONDS_PER_DAY + field("seconds")?) * MICROS_PER_SECOND
        + field("microseconds")?;
    let micros = i64::try_from(micros)
        .map_err(|_| Error::invalid_value(format!("{} is out of range", what)))?;
    Ok(chrono::Duration::microseconds(micros))
}

/// Convert a signed span to a `datetime.timedelta`
///
/// Sub-microsecond precision is truncated.
pub fn to_timedelta(py: Python<'_>, duration: chrono::Duration) -> PyResult<PyObject> {
    let micros = duration.num_microseconds().ok_or_else(|| {
        crate::error::to_py_err(Error::invalid_value("duration exceeds timedelta range"))
    })?;

    let timedelta = py.import("datetime")?.getattr("timedelta")?;
    Ok(timedelta.call1((0, 0, micros))?.into_py(py))
}

fn describe(value: &PyAny) -> String {
    value
        .repr()
        .map(|r| r.to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string())
}
