//! Literal escaping for query text.

use crate::error::{FormatError, FormatResult};
use crate::value::{format_datetime, format_time, Value};

/// Converts values into literal fragments safe to splice into query text.
///
/// Implementations must be stateless (or internally synchronized) since a
/// formatter may be shared across threads.
pub trait Escaper: Send + Sync {
    /// Render a value as a literal.
    fn escape_literal(&self, value: &Value) -> FormatResult<String>;

    /// Append a value to a condition, using `IS NULL` for null.
    fn get_condition(&self, value: &Value, condition: &str) -> FormatResult<String> {
        if value.is_null() {
            return Ok(format!("{} IS NULL", condition));
        }
        Ok(format!("{} {}", condition, self.escape_literal(value)?))
    }

    /// Render a name as a quoted identifier.
    fn escape_identifier(&self, name: &str) -> String {
        quote_identifier(name)
    }
}

/// PostgreSQL-flavoured escaper.
///
/// | value | literal |
/// |-------|---------|
/// | null | `NULL` |
/// | int, bool | `42`, `True` |
/// | date / datetime / time | `'2024-01-02'::date`, `'...'::timestamp`, `'...'::time` |
/// | uuid | `'...'::uuid` |
/// | text | single quotes doubled, no surrounding quotes |
/// | list | elements escaped recursively, joined with `, ` |
///
/// Floats and maps are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlEscaper;

impl Escaper for SqlEscaper {
    fn escape_literal(&self, value: &Value) -> FormatResult<String> {
        let literal = match value {
            Value::Null => "NULL".to_string(),
            Value::Int(_) | Value::Bool(_) => value.to_string(),
            Value::Date(d) => format!("'{}'::date", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => format!("'{}'::timestamp", format_datetime(dt)),
            Value::Time(t) => format!("'{}'::time", format_time(t)),
            Value::Uuid(u) => format!("'{}'::uuid", u.hyphenated()),
            Value::Text(s) => s.replace('\'', "''"),
            Value::List(items) => items
                .iter()
                .map(|item| self.escape_literal(item))
                .collect::<FormatResult<Vec<_>>>()?
                .join(", "),
            Value::Float(_) | Value::Map(_) | Value::Deferred(_) => {
                return Err(FormatError::UnsupportedType {
                    kind: value.type_name().to_string(),
                    value: value.repr(),
                })
            }
        };
        Ok(literal)
    }
}

/// Wrap a name in double quotes, doubling embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
