//! Value codec
//!
//! Converts the scalar and duration values carried by callback dispatch
//! between the native representation used inside the core and the foreign
//! representation handed to callback implementations.
//!
//! Foreign runtimes model time spans as signed quantities, so the foreign
//! duration is a [`chrono::Duration`]. Native durations are never negative,
//! which makes [`decode`] the place where negative spans are rejected.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Native value passed through a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Unsigned 32-bit integer
    U32(u32),
    /// Non-negative time span
    Duration(Duration),
}

/// Foreign-side representation of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignValue {
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed time span, as foreign runtimes model it
    Duration(chrono::Duration),
}

impl Value {
    /// Short name of the value kind
    pub fn kind(&self) -> &'static str {
        match self {
            Value::U32(_) => "u32",
            Value::Duration(_) => "duration",
        }
    }

    /// Extract the integer, failing if this is another kind
    pub fn into_u32(self) -> Result<u32> {
        match self {
            Value::U32(v) => Ok(v),
            other => Err(Error::invalid_value(format!(
                "expected u32, found {}",
                other.kind()
            ))),
        }
    }

    /// Extract the duration, failing if this is another kind
    pub fn into_duration(self) -> Result<Duration> {
        match self {
            Value::Duration(d) => Ok(d),
            other => Err(Error::invalid_value(format!(
                "expected duration, found {}",
                other.kind()
            ))),
        }
    }
}

impl ForeignValue {
    /// Short name of the value kind
    pub fn kind(&self) -> &'static str {
        match self {
            ForeignValue::U32(_) => "u32",
            ForeignValue::Duration(_) => "duration",
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::U32(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U32(v) => write!(f, "{}", v),
            Value::Duration(d) => write!(f, "{:?}", d),
        }
    }
}

/// Convert a native value to its foreign representation
pub fn encode(value: Value) -> Result<ForeignValue> {
    match value {
        Value::U32(v) => Ok(ForeignValue::U32(v)),
        Value::Duration(d) => encode_duration(d).map(ForeignValue::Duration),
    }
}

/// Convert a foreign value back to its native representation
pub fn decode(value: ForeignValue) -> Result<Value> {
    match value {
        ForeignValue::U32(v) => Ok(Value::U32(v)),
        ForeignValue::Duration(d) => decode_duration(d).map(Value::Duration),
    }
}

/// Native duration to foreign span
///
/// Fails when the duration exceeds the signed millisecond range of the
/// foreign representation.
pub fn encode_duration(duration: Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(duration).map_err(|_| {
        Error::invalid_value(format!(
            "duration of {}s exceeds the foreign range",
            duration.as_secs()
        ))
    })
}

/// Foreign span to native duration
///
/// Negative spans have no native counterpart and fail with `InvalidValue`.
pub fn decode_duration(duration: chrono::Duration) -> Result<Duration> {
    duration.to_std().map_err(|_| {
        Error::invalid_value(format!(
            "negative duration ({}ms) is not allowed",
            duration.num_milliseconds()
        ))
    })
}

/// Tick unit used when a duration crosses the C ABI as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationUnit {
    /// Whole milliseconds
    #[default]
    Milliseconds,
    /// Whole seconds
    Seconds,
}

impl DurationUnit {
    /// Express a foreign span as a tick count
    ///
    /// Spans that do not divide evenly into the unit are rejected rather than
    /// truncated.
    pub fn to_ticks(self, duration: chrono::Duration) -> Result<i64> {
        if duration < chrono::Duration::zero() {
            return Err(Error::invalid_value(format!(
                "negative duration ({}ms) is not allowed",
                duration.num_milliseconds()
            )));
        }

        let (ticks, whole) = match self {
            DurationUnit::Milliseconds => {
                let ms = duration.num_milliseconds();
                (ms, chrono::Duration::milliseconds(ms))
            }
            DurationUnit::Seconds => {
                let secs = duration.num_seconds();
                (secs, chrono::Duration::seconds(secs))
            }
        };

        if whole != duration {
            return Err(Error::invalid_value(format!(
                "duration is not a whole number of {}",
                self
            )));
        }

        Ok(ticks)
    }

    /// Build a foreign span from a tick count
    pub fn from_ticks(self, ticks: i64) -> Result<chrono::Duration> {
        if ticks < 0 {
            return Err(Error::invalid_value(format!(
                "negative duration ({} {}) is not allowed",
                ticks, self
            )));
        }

        match self {
            DurationUnit::Milliseconds => Ok(chrono::Duration::milliseconds(ticks)),
            DurationUnit::Seconds => ticks
                .checked_mul(1000)
                .map(chrono::Duration::milliseconds)
                .ok_or_else(|| {
                    Error::invalid_value(format!("{} seconds exceeds the foreign range", ticks))
                }),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Milliseconds => write!(f, "milliseconds"),
            DurationUnit::Seconds => write!(f, "seconds"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_passes_through() {
        assert_eq!(encode(Value::U32(76)).unwrap(), ForeignValue::U32(76));
        assert_eq!(decode(ForeignValue::U32(u32::MAX)).unwrap(), Value::U32(u32::MAX));
    }

    #[test]
    fn test_duration_keeps_nanoseconds() {
        let native = Duration::new(76, 123_456_789);
        let foreign = encode(Value::Duration(native)).unwrap();
        assert_eq!(decode(foreign).unwrap(), Value::Duration(native));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = decode(ForeignValue::Duration(chrono::Duration::seconds(-1))).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let err = encode_duration(Duration::from_secs(u64::MAX)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_kind_mismatch() {
        assert!(Value::U32(1).into_duration().is_err());
        assert_eq!(
            Value::from(Duration::from_secs(2)).into_duration().unwrap(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_ticks() {
        let span = chrono::Duration::seconds(76);
        assert_eq!(DurationUnit::Milliseconds.to_ticks(span).unwrap(), 76_000);
        assert_eq!(DurationUnit::Seconds.to_ticks(span).unwrap(), 76);
        assert_eq!(DurationUnit::Seconds.from_ticks(76).unwrap(), span);
    }

    #[test]
    fn test_ticks_refuse_truncation() {
        let span = chrono::Duration::milliseconds(1500);
        assert!(DurationUnit::Seconds.to_ticks(span).is_err());

        let span = chrono::Duration::microseconds(10);
        assert!(DurationUnit::Milliseconds.to_ticks(span).is_err());
    }

    #[test]
    fn test_negative_ticks() {
        assert!(DurationUnit::Milliseconds.from_ticks(-5).is_err());
        assert!(DurationUnit::Seconds.to_ticks(chrono::Duration::seconds(-5)).is_err());
        assert!(DurationUnit::Seconds.from_ticks(i64::MAX).is_err());
    }
}
