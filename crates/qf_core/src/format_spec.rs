//! Base text formatting with a standard format-spec mini-language.
//!
//! Grammar: `[[fill]align][sign][#][0][width][.precision][type]`
//!
//! - text: type `s`, precision truncates
//! - int (and bool with a non-empty spec): types `d b o x X`, plus `f F %`
//!   which format the integer as a float
//! - float: types `f F %`, precision defaults to 6
//! - date, datetime, time: the whole spec is a strftime pattern

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};

use crate::error::{FormatError, FormatResult};
use crate::value::{format_float, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    sign: Sign,
    alternate: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

/// Parse a width or precision. Values above `u16::MAX` are rejected, the
/// runtime limit of `format!` precision.
fn bounded(digits: &[char]) -> Option<usize> {
    let n: usize = digits.iter().collect::<String>().parse().ok()?;
    (n <= usize::from(u16::MAX)).then_some(n)
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = Self {
            fill: ' ',
            align: None,
            sign: Sign::Minus,
            alternate: false,
            zero: false,
            width: 0,
            precision: None,
            kind: None,
        };
        let mut i = 0;

        if let Some(align) = chars.get(1).and_then(|c| align_of(*c)) {
            parsed.fill = chars[0];
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().and_then(|c| align_of(*c)) {
            parsed.align = Some(align);
            i = 1;
        }

        match chars.get(i) {
            Some('+') => {
                parsed.sign = Sign::Plus;
                i += 1;
            }
            Some(' ') => {
                parsed.sign = Sign::Space;
                i += 1;
            }
            Some('-') => i += 1,
            _ => {}
        }

        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }

        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let start = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        if i > start {
            parsed.width = bounded(&chars[start..i])?;
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
            if i == start {
                return None;
            }
            parsed.precision = Some(bounded(&chars[start..i])?);
        }

        if let Some(kind) = chars.get(i) {
            parsed.kind = Some(*kind);
            i += 1;
        }

        (i == chars.len()).then_some(parsed)
    }

    fn fill_align(&self, default: Align) -> (char, Align) {
        match self.align {
            Some(align) => (self.fill, align),
            None if self.zero && default == Align::Right => ('0', Align::AfterSign),
            None if self.zero => ('0', default),
            None => (' ', default),
        }
    }

    fn sign_of(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        }
    }

    fn pad(&self, sign: &str, body: &str, default: Align) -> String {
        let len = sign.chars().count() + body.chars().count();
        if len >= self.width {
            return format!("{}{}", sign, body);
        }

        let missing = self.width - len;
        let (fill, align) = self.fill_align(default);
        let fill = |n: usize| fill.to_string().repeat(n);

        match align {
            Align::Left => format!("{}{}{}", sign, body, fill(missing)),
            Align::Right => format!("{}{}{}", fill(missing), sign, body),
            Align::Center => {
                let left = missing / 2;
                format!("{}{}{}{}", fill(left), sign, body, fill(missing - left))
            }
            Align::AfterSign => format!("{}{}{}", sign, fill(missing), body),
        }
    }
}

/// Format `value` according to `spec`. An empty spec yields the plain
/// display form.
pub fn format_value(value: &Value, spec: &str) -> FormatResult<String> {
    if spec.is_empty() {
        return Ok(value.to_string());
    }

    let invalid = || FormatError::InvalidFormatSpec {
        spec: spec.to_string(),
        kind: value.type_name().to_string(),
    };

    if matches!(value, Value::Date(_) | Value::DateTime(_) | Value::Time(_)) {
        return strftime(value, spec).ok_or_else(invalid);
    }

    let parsed = FormatSpec::parse(spec).ok_or_else(invalid)?;
    let formatted = match value {
        Value::Text(s) => format_text(s, &parsed),
        Value::Int(i) => format_int(*i, &parsed),
        Value::Bool(b) => format_int(i64::from(*b), &parsed),
        Value::Float(f) => format_float_spec(*f, &parsed),
        _ => None,
    };
    formatted.ok_or_else(invalid)
}

fn format_text(s: &str, spec: &FormatSpec) -> Option<String> {
    if !matches!(spec.kind, None | Some('s'))
        || spec.sign != Sign::Minus
        || spec.alternate
        || spec.align == Some(Align::AfterSign)
    {
        return None;
    }

    let body: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    Some(spec.pad("", &body, Align::Left))
}

fn format_int(i: i64, spec: &FormatSpec) -> Option<String> {
    if matches!(spec.kind, Some('f' | 'F' | '%')) {
        return format_float_spec(i as f64, spec);
    }
    if spec.precision.is_some() {
        return None;
    }

    let magnitude = i.unsigned_abs();
    let (prefix, digits) = match spec.kind {
        None | Some('d') => ("", magnitude.to_string()),
        Some('b') => ("0b", format!("{:b}", magnitude)),
        Some('o') => ("0o", format!("{:o}", magnitude)),
        Some('x') => ("0x", format!("{:x}", magnitude)),
        Some('X') => ("0X", format!("{:X}", magnitude)),
        _ => return None,
    };

    let sign = format!(
        "{}{}",
        spec.sign_of(i < 0),
        if spec.alternate { prefix } else { "" }
    );
    Some(spec.pad(&sign, &digits, Align::Right))
}

fn format_float_spec(f: f64, spec: &FormatSpec) -> Option<String> {
    let negative = f.is_sign_negative() && f != 0.0;
    let magnitude = f.abs();

    let body = match spec.kind {
        None if spec.precision.is_none() => format_float(magnitude),
        Some('f' | 'F') if !magnitude.is_finite() => {
            let text = format_float(magnitude);
            if spec.kind == Some('F') {
                text.to_uppercase()
            } else {
                text
            }
        }
        Some('f' | 'F') => format!("{:.*}", spec.precision.unwrap_or(6), magnitude),
        Some('%') => format!("{:.*}%", spec.precision.unwrap_or(6), magnitude * 100.0),
        _ => return None,
    };

    Some(spec.pad(spec.sign_of(negative), &body, Align::Right))
}

fn strftime(value: &Value, spec: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(spec).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut out = String::new();
    let written = match value {
        Value::Date(d) => write!(out, "{}", d.format_with_items(items.iter())),
        Value::DateTime(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
        Value::Time(t) => write!(out, "{}", t.format_with_items(items.iter())),
        _ => return None,
    };
    written.ok().map(|_| out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fmt(value: impl Into<Value>, spec: &str) -> String {
        format_value(&value.into(), spec).unwrap()
    }

    #[test]
    fn test_empty_spec_is_display() {
        assert_eq!(fmt(Value::Null, ""), "None");
        assert_eq!(fmt(true, ""), "True");
        assert_eq!(fmt(vec![1, 2], ""), "[1, 2]");
    }

    #[test]
    fn test_text_alignment() {
        assert_eq!(fmt("ab", ">5"), "   ab");
        assert_eq!(fmt("ab", "*^6"), "**ab**");
        assert_eq!(fmt("ab", "5"), "ab   ");
        assert_eq!(fmt("abcdef", ".3"), "abc");
        assert_eq!(fmt("abc", "s"), "abc");
    }

    #[test]
    fn test_integers() {
        assert_eq!(fmt(42, "05d"), "00042");
        assert_eq!(fmt(-42, "05"), "-0042");
        assert_eq!(fmt(42, "+d"), "+42");
        assert_eq!(fmt(255, "#x"), "0xff");
        assert_eq!(fmt(255, "X"), "FF");
        assert_eq!(fmt(5, "b"), "101");
        assert_eq!(fmt(7, "<4"), "7   ");
        assert_eq!(fmt(true, "d"), "1");
        assert_eq!(fmt(3, ".2f"), "3.00");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt(3.14159, ".2f"), "3.14");
        assert_eq!(fmt(-1.5, "8.1f"), "    -1.5");
        assert_eq!(fmt(0.25, ".0%"), "25%");
        assert_eq!(fmt(2.0, ">5"), "  2.0");
    }

    #[test]
    fn test_temporal_strftime() {
        let date = NaiveDate::from_ymd_opt(2021, 5, 17).unwrap();
        assert_eq!(fmt(date, "%d.%m.%Y"), "17.05.2021");
        assert!(format_value(&Value::from(date), "%H").is_err());
    }

    #[test]
    fn test_invalid_specs() {
        assert!(format_value(&Value::from("x"), "d").is_err());
        assert!(format_value(&Value::from("x"), "+").is_err());
        assert!(format_value(&Value::from(1), ".2").is_err());
        assert!(format_value(&Value::from(1), "5.").is_err());
        assert!(format_value(&Value::from(1), "zz").is_err());
        assert!(format_value(&Value::Null, ">3").is_err());
        assert!(format_value(&Value::list(vec![1]), "s").is_err());
    }

    #[test]
    fn test_oversized_width_and_precision_rejected() {
        assert!(format_value(&Value::from(1), ".70000f").is_err());
        assert!(format_value(&Value::from(1.5), ".65536").is_err());
        assert!(format_value(&Value::from("x"), "70000").is_err());
        assert_eq!(fmt(1.5, ".2f"), "1.50");
    }
}
