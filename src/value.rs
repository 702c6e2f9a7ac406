use std::{
    fmt::{self, Debug, Display},
    time::{Duration, SystemTime},
};

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

/// A single entry of a field list.
///
/// Field lists alternate keys and values: `["path", "/tmp", "size", 42]`.
/// Formatters decide how each variant is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Time(DateTime<FixedOffset>),
    Duration(Duration),
    /// Message of an error value.
    Error(String),
    /// Output of a `Display` implementation.
    Display(String),
    /// Output of a `Debug` implementation.
    Debug(String),
}

impl Value {
    pub fn display(value: &impl Display) -> Self {
        Value::Display(value.to_string())
    }

    pub fn debug(value: &impl Debug) -> Self {
        Value::Debug(format!("{:?}", value))
    }

    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        Value::Error(err.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used by plain-text formatters.
    pub fn to_text(&self) -> String {
        match self {
            Value::Nil => "<nil>".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Uint(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Str(v) | Value::Error(v) | Value::Display(v) | Value::Debug(v) => v.clone(),
            Value::Time(v) => v.to_rfc3339_opts(SecondsFormat::Secs, true),
            Value::Duration(v) => humantime::format_duration(*v).to_string(),
        }
    }

    /// JSON form; `None` when the value has no JSON representation.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        let json = match self {
            Value::Nil => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int(v) => Json::from(*v),
            Value::Uint(v) => Json::from(*v),
            Value::Float(v) => Json::Number(serde_json::Number::from_f64(*v)?),
            Value::Str(v) | Value::Error(v) | Value::Display(v) | Value::Debug(v) => {
                Json::String(v.clone())
            }
            Value::Time(v) => Json::String(v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Duration(v) => Json::from(u64::try_from(v.as_nanos()).unwrap_or(u64::MAX)),
        };

        Some(json)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Uint(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Value {
    fn from(value: DateTime<Tz>) -> Self {
        Value::Time(value.fixed_offset())
    }
}

impl From<SystemTime> for Value {
    fn from(value: SystemTime) -> Self {
        Value::from(DateTime::<Local>::from(value))
    }
}

impl From<&eyre::Report> for Value {
    fn from(value: &eyre::Report) -> Self {
        Value::Error(value.to_string())
    }
}

impl From<&std::io::Error> for Value {
    fn from(value: &std::io::Error) -> Self {
        Value::Error(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::UNIX_EPOCH;

    #[test]
    fn test_text_coercion() {
        let t = Utc.with_ymd_and_hms(2016, 2, 21, 21, 3, 37).unwrap();

        assert_eq!(Value::Nil.to_text(), "<nil>");
        assert_eq!(Value::from(1).to_text(), "1");
        assert_eq!(Value::from(-1).to_text(), "-1");
        assert_eq!(Value::from(0.1).to_text(), "0.1");
        assert_eq!(Value::from(t).to_text(), "2016-02-21T21:03:37Z");
        assert_eq!(Value::from(Duration::from_secs(10)).to_text(), "10s");
        assert_eq!(Value::from(None::<i32>).to_text(), "<nil>");
    }

    #[test]
    fn test_times_drop_fractional_seconds() {
        let t = Utc.timestamp_opt(1456088617, 123_456_789).unwrap();
        assert_eq!(Value::from(t).to_text(), "2016-02-21T21:03:37Z");
        assert_eq!(Value::from(t).to_json(), Some(serde_json::json!("2016-02-21T21:03:37Z")));

        let now = UNIX_EPOCH + Duration::new(1456088617, 123_456_789);
        let local = DateTime::<Local>::from(now).to_rfc3339_opts(SecondsFormat::Secs, true);
        assert_eq!(Value::from(now).to_text(), local);
        assert!(!local.contains('.'));
    }

    #[test]
    fn test_text_coercion_of_wrapped_values() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(Value::from(&err).to_text(), "boom");
        assert_eq!(Value::display(&std::net::Ipv4Addr::LOCALHOST).to_text(), "127.0.0.1");
        assert_eq!(Value::debug(&Some(3)).to_text(), "Some(3)");
    }

    #[test]
    fn test_json_coercion() {
        let t = Utc.with_ymd_and_hms(2016, 2, 21, 21, 3, 37).unwrap();

        assert_eq!(Value::Nil.to_json(), Some(serde_json::Value::Null));
        assert_eq!(Value::from(t).to_json(), Some(serde_json::json!("2016-02-21T21:03:37Z")));
        assert_eq!(
            Value::from(Duration::from_secs(10)).to_json(),
            Some(serde_json::json!(10_000_000_000u64))
        );
        assert_eq!(Value::from(f64::NAN).to_json(), None);
    }
}
