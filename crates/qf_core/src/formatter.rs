//! Recursive template formatting.

use std::fmt;
use std::sync::Arc;

use qf_tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::arguments::Arguments;
use crate::directive::Directive;
use crate::error::{FormatError, FormatResult};
use crate::escape::{quote_identifier, Escaper, SqlEscaper};
use crate::format_spec::format_value;
use crate::resolver::FieldResolver;
use crate::value::Value;

/// Default recursion budget of a format call.
pub const DEFAULT_MAX_DEPTH: i32 = 10;

/// Formatter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// Number of nested expansions allowed below the top-level template
    pub max_depth: i32,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FormatterOptions {
    pub fn with_max_depth(mut self, max_depth: i32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Output of a single directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// Finished text, exempt from another expansion pass
    pub already_formatted: bool,
}

impl Fragment {
    fn finished(text: String) -> Self {
        Self {
            text,
            already_formatted: true,
        }
    }

    fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            already_formatted: false,
        }
    }
}

/// Formats query templates against an [`Arguments`] context.
///
/// Holds only its escaper and options, so one instance can serve any number
/// of concurrent calls.
#[derive(Clone, Default)]
pub struct QueryFormatter {
    escaper: Option<Arc<dyn Escaper>>,
    options: FormatterOptions,
}

impl fmt::Debug for QueryFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFormatter")
            .field("escaper", &self.escaper.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl QueryFormatter {
    /// Create a formatter without an escaper: values are formatted as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter escaping values with [`SqlEscaper`].
    pub fn sql() -> Self {
        Self::new().with_escaper(SqlEscaper)
    }

    pub fn with_escaper(mut self, escaper: impl Escaper + 'static) -> Self {
        self.escaper = Some(Arc::new(escaper));
        self
    }

    pub fn with_options(mut self, options: FormatterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn escaper(&self) -> Option<&dyn Escaper> {
        self.escaper.as_deref()
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    /// Format `template` against `args`.
    ///
    /// Every positional argument must be referenced at least once.
    ///
    /// The output of a plain `{field}` gets one more expansion pass, so
    /// braces inside bound text values are expanded too: `"{secret}"` renders
    /// the `secret` argument and an unbalanced `"a{b"` fails to tokenize.
    /// Double the braces of untrusted text, or use `tmpl`, to keep them
    /// literal.
    pub fn format(&self, template: &str, args: &Arguments) -> FormatResult<String> {
        let mut resolver = FieldResolver::new(args);
        let result = self.expand(template, &mut resolver, self.options.max_depth)?;

        if let Some(index) = resolver.first_unused_positional() {
            return Err(FormatError::UnusedArgument { index });
        }

        Ok(result)
    }

    /// Run the directive selected by `spec` on a single value.
    pub fn format_field(
        &self,
        value: &Value,
        spec: &str,
        args: &Arguments,
    ) -> FormatResult<Fragment> {
        self.dispatch(value, spec, args, self.options.max_depth)
    }

    fn expand(
        &self,
        template: &str,
        resolver: &mut FieldResolver<'_>,
        depth: i32,
    ) -> FormatResult<String> {
        if depth < 0 {
            return Err(FormatError::RecursionLimit {
                limit: self.options.max_depth,
            });
        }

        let mut out = String::with_capacity(template.len());

        for chunk in Tokenizer::new(template) {
            let chunk = chunk?;
            out.push_str(chunk.literal);

            let Some(field) = chunk.field else {
                continue;
            };
            trace!(field = field.name, spec = field.spec, depth, "expanding field");

            let wrap = |value: &Value, source: FormatError| FormatError::FieldFormatting {
                field: field.name.to_string(),
                value: value.to_string(),
                template: template.to_string(),
                source: Box::new(source),
            };

            let value = match resolver.resolve(field.name) {
                Ok((value, _)) => value,
                Err(e @ FormatError::ManualAutoIndexMix { .. }) => return Err(e),
                Err(e) => return Err(wrap(&Value::Null, e)),
            };
            let value = convert(&value, field.conversion).map_err(|e| wrap(&value, e))?;

            let fragment = self
                .dispatch(&value, field.spec, resolver.args(), depth)
                .map_err(|e| wrap(&value, e))?;

            if fragment.already_formatted {
                out.push_str(&fragment.text);
            } else {
                let expanded = self.expand(&fragment.text, resolver, depth - 1)?;
                out.push_str(&expanded);
            }
        }

        Ok(out)
    }

    /// Render a template against a derived, keyword-only context.
    fn render_nested(&self, template: &str, args: &Arguments, depth: i32) -> FormatResult<String> {
        let mut resolver = FieldResolver::new(args);
        self.expand(template, &mut resolver, depth)
    }

    fn dispatch(
        &self,
        value: &Value,
        spec: &str,
        args: &Arguments,
        depth: i32,
    ) -> FormatResult<Fragment> {
        let directive = Directive::parse(spec)?;
        debug!(
            directive = directive.name(),
            kind = value.type_name(),
            depth,
            "dispatching directive"
        );

        match directive {
            Directive::Default(spec) => {
                let text = match self.escaper() {
                    Some(escaper) => format_value(&Value::Text(escaper.escape_literal(value)?), spec)?,
                    None => format_value(value, spec)?,
                };
                Ok(Fragment::pending(text))
            }
            Directive::Include => self
                .include(value, args, depth)
                .map(Fragment::finished),
            Directive::Idf => match value {
                Value::Text(name) => {
                    let quoted = match self.escaper() {
                        Some(escaper) => escaper.escape_identifier(name),
                        None => quote_identifier(name),
                    };
                    Ok(Fragment::finished(quoted))
                }
                other => Err(FormatError::UnsupportedType {
                    kind: other.type_name().to_string(),
                    value: other.repr(),
                }),
            },
            Directive::Repeat {
                separator,
                template,
            } => self.repeat(value, separator, template, args, depth),
            Directive::Branch { condition, text } => {
                let text = if condition.holds(value)? { text } else { "" };
                Ok(Fragment::pending(text))
            }
            Directive::Tmpl => {
                let text = if value.is_truthy() {
                    format_value(value, "")?
                } else {
                    String::new()
                };
                Ok(Fragment::finished(text))
            }
        }
    }

    /// Render the value as a template, either bare or as
    /// `[template, {extra named values}]`.
    fn include(&self, value: &Value, args: &Arguments, depth: i32) -> FormatResult<String> {
        let no_extra: &[(String, Value)] = &[];
        let (template, extra) = match value {
            Value::List(items) => match items.as_slice() {
                [template, Value::Map(extra)] => (template, extra.as_slice()),
                _ => {
                    return Err(FormatError::directive(
                        "include",
                        "a list value must be [template, {named values}]",
                    ))
                }
            },
            other => (other, no_extra),
        };

        let template = match template {
            Value::Text(text) => text.as_str(),
            falsy if !falsy.is_truthy() => "",
            other => {
                return Err(FormatError::directive(
                    "include",
                    format!("template must be text, got \"{}\"", other.type_name()),
                ))
            }
        };

        debug!(depth, extra = extra.len(), "rendering included template");
        let nested = args.layered(extra.iter().cloned());
        self.render_nested(template, &nested, depth - 1)
    }

    fn repeat(
        &self,
        value: &Value,
        separator: &str,
        template: &str,
        args: &Arguments,
        depth: i32,
    ) -> FormatResult<Fragment> {
        if !value.is_truthy() {
            return Ok(Fragment::pending(""));
        }

        let render = |extra: Vec<(&str, Value)>| {
            self.render_nested(template, &args.layered(extra), depth - 1)
        };

        let parts = match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(key, item)| render(vec![("item", item.clone()), ("key", Value::from(key.as_str()))]))
                .collect::<FormatResult<Vec<_>>>()?,
            Value::List(items) => items
                .iter()
                .map(|item| render(vec![("item", item.clone())]))
                .collect::<FormatResult<Vec<_>>>()?,
            Value::Text(text) => text
                .chars()
                .map(|c| render(vec![("item", Value::Text(c.to_string()))]))
                .collect::<FormatResult<Vec<_>>>()?,
            other => {
                return Err(FormatError::directive(
                    "repeat",
                    format!("value of type \"{}\" is not iterable", other.type_name()),
                ))
            }
        };

        debug!(items = parts.len(), "repeated template");
        Ok(Fragment::finished(parts.join(separator)))
    }
}

/// Apply a `!s`, `!r` or `!a` conversion.
fn convert(value: &Value, conversion: Option<char>) -> FormatResult<Value> {
    match conversion {
        None => Ok(value.clone()),
        Some('s') => Ok(Value::Text(value.to_string())),
        Some('r') => Ok(Value::Text(value.repr())),
        Some('a') => Ok(Value::Text(value.ascii_repr())),
        Some(other) => Err(FormatError::InvalidConversion(other)),
    }
}
