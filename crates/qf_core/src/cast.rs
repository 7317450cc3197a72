//! Casting literal directive operands to runtime types.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{FormatError, FormatResult};
use crate::value::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Types a literal may be cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Str,
    Int,
    Date,
    DateTime,
    Time,
    Bool,
    Null,
}

impl CastType {
    /// Look up a whitelisted type name. Names match [`Value::type_name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Self::Str),
            "int" => Some(Self::Int),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::DateTime),
            "time" => Some(Self::Time),
            "bool" => Some(Self::Bool),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Bool => "bool",
            Self::Null => "null",
        }
    }

    /// Convert `literal` to this type.
    pub fn cast(&self, literal: &str) -> FormatResult<Value> {
        let fail = || FormatError::TypeCast {
            value: literal.to_string(),
            target: self.as_str().to_string(),
        };

        let value = match self {
            Self::Str => Value::Text(literal.to_string()),
            Self::Int => Value::Int(literal.trim().parse().map_err(|_| fail())?),
            Self::Date => {
                Value::Date(NaiveDate::parse_from_str(literal, DATE_FORMAT).map_err(|_| fail())?)
            }
            Self::DateTime => Value::DateTime(
                NaiveDateTime::parse_from_str(literal, DATETIME_FORMAT).map_err(|_| fail())?,
            ),
            Self::Time => {
                Value::Time(NaiveTime::parse_from_str(literal, TIME_FORMAT).map_err(|_| fail())?)
            }
            Self::Bool => match literal {
                "True" => Value::Bool(true),
                "False" => Value::Bool(false),
                _ => return Err(fail()),
            },
            // Anything but the null token stays text so it never equals null
            Self::Null => match literal {
                "None" => Value::Null,
                other => Value::Text(other.to_string()),
            },
        };

        Ok(value)
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cast `value` to the type named `type_name`.
///
/// Fails with [`FormatError::TypeCast`] when the name is outside the
/// whitelist or the literal does not parse.
pub fn cast_to_type(value: &str, type_name: &str) -> FormatResult<Value> {
    let target = CastType::from_name(type_name).ok_or_else(|| FormatError::TypeCast {
        value: value.to_string(),
        target: type_name.to_string(),
    })?;
    target.cast(value)
}
