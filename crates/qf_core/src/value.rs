//! Runtime values bound to template fields.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use uuid::Uuid;

/// A lazily produced value.
///
/// The producer runs when the field referencing it is formatted, once per
/// reference.
#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> Value + Send + Sync>);

impl Deferred {
    pub fn new(producer: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    /// Run the producer.
    pub fn resolve(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// A value that can be bound to a template field.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Uuid(Uuid),
    List(Vec<Value>),
    /// Insertion-ordered mapping with unique keys
    Map(Vec<(String, Value)>),
    Deferred(Deferred),
}

impl Value {
    /// Build a map value. Later duplicates replace earlier keys in place.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut map: Vec<(String, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            match map.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => map.push((key, value)),
            }
        }
        Self::Map(map)
    }

    /// Build a list value.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Wrap a producer as a deferred value.
    pub fn deferred(producer: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Deferred(Deferred::new(producer))
    }

    /// Type name used by the caster and in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "str",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
            Self::Uuid(_) => "uuid",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Deferred(_) => "deferred",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness used by `if`, `repeat`, `include` and `tmpl`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
            Self::Date(_) | Self::DateTime(_) | Self::Time(_) | Self::Uuid(_) | Self::Deferred(_) => {
                true
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Run deferred producers until a concrete value comes out.
    pub fn resolved(self) -> Value {
        let mut value = self;
        while let Self::Deferred(deferred) = &value {
            let next = deferred.resolve();
            value = next;
        }
        value
    }

    /// Debug-style rendering: text is quoted, everything else displays as usual.
    pub fn repr(&self) -> String {
        match self {
            Self::Text(s) => quote_text(s),
            other => other.to_string(),
        }
    }

    /// Like [`Value::repr`] with non-ASCII characters escaped.
    pub fn ascii_repr(&self) -> String {
        let mut out = String::new();
        for c in self.repr().chars() {
            let code = c as u32;
            if c.is_ascii() {
                out.push(c);
            } else if code <= 0xff {
                out.push_str(&format!("\\x{:02x}", code));
            } else if code <= 0xffff {
                out.push_str(&format!("\\u{:04x}", code));
            } else {
                out.push_str(&format!("\\U{:08x}", code));
            }
        }
        out
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn quote_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// `HH:MM:SS`, with microseconds only when present.
pub(crate) fn format_time(time: &NaiveTime) -> String {
    let micros = time.nanosecond() % 1_000_000_000 / 1_000;
    if micros == 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", time.format("%H:%M:%S"), micros)
    }
}

pub(crate) fn format_datetime(datetime: &NaiveDateTime) -> String {
    format!(
        "{} {}",
        datetime.date().format("%Y-%m-%d"),
        format_time(&datetime.time())
    )
}

pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => f.write_str(&format_datetime(dt)),
            Self::Time(t) => f.write_str(&format_time(t)),
            Self::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::repr).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote_text(k), v.repr()))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Deferred(_) => f.write_str("<deferred>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.partial_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.partial_cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.partial_cmp(b),
            (Self::List(a), Self::List(b)) => a.partial_cmp(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Self::Deferred(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(entries) => Self::map(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::from("False").is_truthy());
        assert!(Value::from(5).is_truthy());
        assert!(Value::from(NaiveTime::from_hms_opt(0, 0, 0).unwrap()).is_truthy());
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Value::from(1), Value::from(true));
        assert_eq!(Value::from(2), Value::from(2.0));
        assert_ne!(Value::from(2), Value::from("2"));
        assert_ne!(Value::Null, Value::from("None"));
    }

    #[test]
    fn test_ordering() {
        assert!(Value::from(3) > Value::from(2));
        assert!(Value::from(false) < Value::from(true));
        assert!(Value::from("b") > Value::from("a"));
        assert_eq!(Value::from(1).partial_cmp(&Value::from("1")), None);
        assert_eq!(Value::Null.partial_cmp(&Value::Null), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::from(true).to_string(), "True");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::list(vec![Value::from(1), Value::from("a")]).to_string(), "[1, 'a']");
        assert_eq!(Value::map([("k", 1)]).to_string(), "{'k': 1}");

        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(10, 20, 30, 1500)
            .unwrap();
        assert_eq!(Value::from(dt).to_string(), "2024-03-01 10:20:30.001500");
        assert_eq!(Value::from(dt.time().with_nanosecond(0).unwrap()).to_string(), "10:20:30");
    }

    #[test]
    fn test_reprs() {
        assert_eq!(Value::from("it's").repr(), "'it\\'s'");
        assert_eq!(Value::from(5).repr(), "5");
        assert_eq!(Value::from("é").ascii_repr(), "'\\xe9'");
    }

    #[test]
    fn test_map_replaces_duplicates() {
        let map = Value::map([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(map.get("a"), Some(&Value::from(3)));
        assert_eq!(map.to_string(), "{'a': 3, 'b': 2}");
    }

    #[test]
    fn test_deferred_resolution() {
        let value = Value::deferred(|| Value::deferred(|| Value::from(7)));
        assert_eq!(value.resolved(), Value::from(7));
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"ids": [1, 2], "name": "x", "ratio": 0.5, "none": null}));
        assert_eq!(value.get("ids"), Some(&Value::list(vec![1, 2])));
        assert_eq!(value.get("name"), Some(&Value::from("x")));
        assert_eq!(value.get("ratio"), Some(&Value::from(0.5)));
        assert_eq!(value.get("none"), Some(&Value::Null));
    }
}
