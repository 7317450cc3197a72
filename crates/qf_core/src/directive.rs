//! Directive selection and condition evaluation.
//!
//! A field's format spec picks one directive by prefix. Prefixes are tested
//! in a fixed order and the first match wins; a spec matching none of them
//! is a plain format spec.
//!
//! | spec | result |
//! |------|--------|
//! | *(other)* | escaped value, formatted with the spec |
//! | `include` | value rendered as a template |
//! | `idf` | value quoted as an identifier |
//! | `repeat:<sep>:<tmpl>` | `tmpl` rendered per item, joined with `sep` |
//! | `in:<a,b>:<text>` / `!in:` | `text` if value is (not) among the candidates |
//! | `exists:<x>:<text>` / `!exists:` | `text` if list value does (not) contain `x` |
//! | `eq:<lit>:<text>` / `!eq:` | `text` if value does (not) equal `lit` |
//! | `gt:<lit>:<text>`, `lt:` | `text` if value is greater / less than `lit` |
//! | `if:<text>` / `!if:` | `text` if value is truthy / falsy |
//! | `tmpl` | value as plain text |

use std::cmp::Ordering;

use crate::cast::cast_to_type;
use crate::error::{FormatError, FormatResult};
use crate::value::Value;

/// Directive families, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Include,
    Idf,
    Repeat,
    NotIn,
    In,
    NotExists,
    Exists,
    NotEq,
    Eq,
    Gt,
    Lt,
    NotIf,
    If,
    Tmpl,
    Default,
}

/// Negated forms precede their plain counterparts.
const PREFIXES: &[(&str, DirectiveKind)] = &[
    ("include", DirectiveKind::Include),
    ("idf", DirectiveKind::Idf),
    ("repeat:", DirectiveKind::Repeat),
    ("!in:", DirectiveKind::NotIn),
    ("in:", DirectiveKind::In),
    ("!exists:", DirectiveKind::NotExists),
    ("exists:", DirectiveKind::Exists),
    ("!eq:", DirectiveKind::NotEq),
    ("eq:", DirectiveKind::Eq),
    ("gt:", DirectiveKind::Gt),
    ("lt:", DirectiveKind::Lt),
    ("!if:", DirectiveKind::NotIf),
    ("if:", DirectiveKind::If),
    ("tmpl", DirectiveKind::Tmpl),
];

impl DirectiveKind {
    /// Select the directive family for a spec.
    pub fn detect(spec: &str) -> Self {
        PREFIXES
            .iter()
            .find(|(prefix, _)| spec.starts_with(prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Idf => "idf",
            Self::Repeat => "repeat",
            Self::NotIn => "!in",
            Self::In => "in",
            Self::NotExists => "!exists",
            Self::Exists => "exists",
            Self::NotEq => "!eq",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::NotIf => "!if",
            Self::If => "if",
            Self::Tmpl => "tmpl",
            Self::Default => "default",
        }
    }
}

/// Test applied by a conditional directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<'s> {
    In { candidates: &'s str, negated: bool },
    Exists { needle: &'s str, negated: bool },
    Eq { literal: &'s str, negated: bool },
    Gt { literal: &'s str },
    Lt { literal: &'s str },
    If { negated: bool },
}

/// A parsed format spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'s> {
    /// Plain format spec, possibly empty
    Default(&'s str),
    Include,
    Idf,
    Repeat { separator: &'s str, template: &'s str },
    /// Conditional text; `text` is returned unescaped when `condition` holds
    Branch { condition: Condition<'s>, text: &'s str },
    Tmpl,
}

/// Split `name:param:rest`, keeping colons inside `rest`.
fn three_parts<'s>(spec: &'s str, kind: DirectiveKind) -> FormatResult<(&'s str, &'s str)> {
    let mut parts = spec.splitn(3, ':');
    let _name = parts.next();
    match (parts.next(), parts.next()) {
        (Some(param), Some(rest)) => Ok((param, rest)),
        _ => Err(FormatError::directive(
            kind.as_str(),
            format!("expected \"{}:<param>:<text>\", got \"{}\"", kind.as_str(), spec),
        )),
    }
}

impl<'s> Directive<'s> {
    pub fn parse(spec: &'s str) -> FormatResult<Self> {
        let kind = DirectiveKind::detect(spec);

        let branch = |condition, text| Directive::Branch { condition, text };
        let directive = match kind {
            DirectiveKind::Default => Self::Default(spec),
            DirectiveKind::Include => Self::Include,
            DirectiveKind::Idf => Self::Idf,
            DirectiveKind::Tmpl => Self::Tmpl,
            DirectiveKind::Repeat => {
                let (separator, template) = three_parts(spec, kind)?;
                Self::Repeat {
                    separator,
                    template,
                }
            }
            DirectiveKind::In | DirectiveKind::NotIn => {
                let (candidates, text) = three_parts(spec, kind)?;
                let negated = kind == DirectiveKind::NotIn;
                branch(Condition::In { candidates, negated }, text)
            }
            DirectiveKind::Exists | DirectiveKind::NotExists => {
                let (needle, text) = three_parts(spec, kind)?;
                let negated = kind == DirectiveKind::NotExists;
                branch(Condition::Exists { needle, negated }, text)
            }
            DirectiveKind::Eq | DirectiveKind::NotEq => {
                let (literal, text) = three_parts(spec, kind)?;
                let negated = kind == DirectiveKind::NotEq;
                branch(Condition::Eq { literal, negated }, text)
            }
            DirectiveKind::Gt => {
                let (literal, text) = three_parts(spec, kind)?;
                branch(Condition::Gt { literal }, text)
            }
            DirectiveKind::Lt => {
                let (literal, text) = three_parts(spec, kind)?;
                branch(Condition::Lt { literal }, text)
            }
            DirectiveKind::If | DirectiveKind::NotIf => {
                // Everything after the first colon, colons included
                let text = spec.split_once(':').map(|(_, text)| text).unwrap_or("");
                let negated = kind == DirectiveKind::NotIf;
                branch(Condition::If { negated }, text)
            }
        };

        Ok(directive)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default(_) => "default",
            Self::Include => "include",
            Self::Idf => "idf",
            Self::Repeat { .. } => "repeat",
            Self::Branch { .. } => "branch",
            Self::Tmpl => "tmpl",
        }
    }
}

/// Order `value` against `literal` cast to the value's type.
fn compare(value: &Value, literal: &str) -> FormatResult<Ordering> {
    let target = cast_to_type(literal, value.type_name())?;
    value
        .partial_cmp(&target)
        .ok_or_else(|| FormatError::Incomparable {
            left: value.type_name().to_string(),
            right: target.type_name().to_string(),
        })
}

impl Condition<'_> {
    /// Whether the condition holds for `value`.
    pub fn holds(&self, value: &Value) -> FormatResult<bool> {
        let result = match self {
            Self::In {
                candidates,
                negated,
            } => contains_candidate(value, candidates)? != *negated,
            Self::Exists { needle, negated } => {
                let found = match value {
                    Value::List(items) => items.iter().any(|item| item.as_str() == Some(*needle)),
                    _ => false,
                };
                found != *negated
            }
            Self::Eq { literal, negated } => {
                let target = cast_to_type(literal, value.type_name())?;
                (*value == target) != *negated
            }
            Self::Gt { literal } => {
                !value.is_null() && compare(value, literal)? == Ordering::Greater
            }
            Self::Lt { literal } => !value.is_null() && compare(value, literal)? == Ordering::Less,
            Self::If { negated } => value.is_truthy() != *negated,
        };
        Ok(result)
    }
}

/// Membership test for `in`/`!in`.
///
/// A list matches when any element equals a candidate cast to that element's
/// type. Any other value is compared against the candidates as text.
fn contains_candidate(value: &Value, candidates: &str) -> FormatResult<bool> {
    let candidates: Vec<&str> = candidates.split(',').collect();

    match value {
        Value::List(items) => {
            for item in items {
                for candidate in &candidates {
                    if cast_to_type(candidate, item.type_name())? == *item {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        other => Ok(candidates.iter().any(|c| other.as_str() == Some(*c))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn holds(spec: &str, value: impl Into<Value>) -> bool {
        match Directive::parse(spec).unwrap() {
            Directive::Branch { condition, .. } => condition.holds(&value.into()).unwrap(),
            other => panic!("not a branch directive: {other:?}"),
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(DirectiveKind::detect("!in:a:b"), DirectiveKind::NotIn);
        assert_eq!(DirectiveKind::detect("in:a:b"), DirectiveKind::In);
        assert_eq!(DirectiveKind::detect("!exists:a:b"), DirectiveKind::NotExists);
        assert_eq!(DirectiveKind::detect("!eq:a:b"), DirectiveKind::NotEq);
        assert_eq!(DirectiveKind::detect("!if:b"), DirectiveKind::NotIf);
        assert_eq!(DirectiveKind::detect("include"), DirectiveKind::Include);
        assert_eq!(DirectiveKind::detect("idf"), DirectiveKind::Idf);
        assert_eq!(DirectiveKind::detect("tmpl"), DirectiveKind::Tmpl);
        assert_eq!(DirectiveKind::detect(">10"), DirectiveKind::Default);
        assert_eq!(DirectiveKind::detect(""), DirectiveKind::Default);
    }

    #[test]
    fn test_parse_keeps_colons_in_text() {
        assert_eq!(
            Directive::parse("repeat:, :{a:if:x}").unwrap(),
            Directive::Repeat {
                separator: ", ",
                template: "{a:if:x}"
            }
        );
        assert_eq!(
            Directive::parse("if:a:b").unwrap(),
            Directive::Branch {
                condition: Condition::If { negated: false },
                text: "a:b"
            }
        );
    }

    #[test]
    fn test_parse_rejects_missing_text() {
        let err = Directive::parse("eq:1").unwrap_err();
        assert!(matches!(err, FormatError::InvalidDirective { ref directive, .. } if directive == "eq"));
        assert!(Directive::parse("repeat:,").is_err());
    }

    #[test]
    fn test_in() {
        assert!(holds("in:2,1,0:T", "0"));
        assert!(!holds("in:1,2,3:T", "9"));
        assert!(!holds("in:1,2,3:T", 2));
        assert!(holds("!in:wool,silk:T", "cotton"));
        assert!(!holds("!in:wool,polyester,silk,cotton:T", "cotton"));
    }

    #[test]
    fn test_in_casts_candidates_per_element() {
        assert!(holds("in:1,2,3:T", vec![5, 3]));
        assert!(!holds("in:1,2,3:T", vec![5, 6]));
        assert!(holds("in:x,y:T", vec!["a", "y"]));
    }

    #[test]
    fn test_in_bad_candidate_for_element_type_fails() {
        let Directive::Branch { condition, .. } = Directive::parse("in:a,b:T").unwrap() else {
            panic!("expected branch");
        };
        assert!(condition.holds(&Value::list(vec![1])).is_err());
    }

    #[test]
    fn test_exists() {
        let value = Value::list(vec![Value::from(0), Value::from("wool"), Value::from("None")]);
        assert!(holds("exists:None:T", value.clone()));
        assert!(holds("!exists:bobcat:T", value));
        assert!(!holds("exists:a:T", "a"));
    }

    #[test]
    fn test_eq_casts_literal() {
        assert!(holds("eq:0:T", 0));
        assert!(!holds("eq:1:T", 0));
        assert!(holds("eq:007:T", 7));
        assert!(holds("!eq:wool:T", "cotton"));
        assert!(!holds("!eq:cotton:T", "cotton"));
        assert!(holds("eq:None:T", Value::Null));
        assert!(!holds("eq:x:T", Value::Null));
        assert!(holds("eq:True:T", true));

        let date = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        assert!(holds("eq:2021-01-02:T", date));
    }

    #[test]
    fn test_ordering_conditions() {
        assert!(holds("gt:0:T", 2));
        assert!(!holds("gt:5:T", 2));
        assert!(holds("lt:True:T", false));
        assert!(!holds("gt:0:T", Value::Null));
        assert!(!holds("lt:0:T", Value::Null));
        assert!(holds("gt:b:T", "c"));
    }

    #[test]
    fn test_ordering_uncastable_fails() {
        let Directive::Branch { condition, .. } = Directive::parse("gt:1:T").unwrap() else {
            panic!("expected branch");
        };
        assert!(condition.holds(&Value::from(1.5)).is_err());
        assert!(condition.holds(&Value::from("a")).is_ok());
        assert!(condition.holds(&Value::from(vec![1])).is_err());
    }

    #[test]
    fn test_if() {
        assert!(!holds("if:T", Value::Null));
        assert!(holds("if:T", 5));
        assert!(!holds("if:T", false));
        assert!(holds("!if:T", false));
        assert!(!holds("!if:T", "False"));
    }
}
