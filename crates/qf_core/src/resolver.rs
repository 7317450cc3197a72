//! Field resolution against an argument context.

use std::collections::HashSet;

use tracing::debug;

use crate::arguments::Arguments;
use crate::error::{FormatError, FormatResult};
use crate::value::Value;

/// Key under which a resolved argument is recorded as used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

/// Positional numbering state of one format call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Empty field names take the next index
    Auto(usize),
    /// A numeric field name was seen; empty names are now invalid
    Manual,
}

impl Default for IndexMode {
    fn default() -> Self {
        Self::Auto(0)
    }
}

/// One `.name` or `[index]` step after the first part of a field name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor<'a> {
    Attr(&'a str),
    Item(&'a str),
}

/// A parsed field name such as `rows[2].id`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldPath<'a> {
    first: &'a str,
    accessors: Vec<Accessor<'a>>,
}

impl<'a> FieldPath<'a> {
    fn parse(field_name: &'a str) -> FormatResult<Self> {
        let invalid = |message: &str| FormatError::InvalidField {
            field: field_name.to_string(),
            message: message.to_string(),
        };

        let split = field_name.find(['.', '[']).unwrap_or(field_name.len());
        let first = &field_name[..split];
        let mut rest = &field_name[split..];
        let mut accessors = Vec::new();

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                if end == 0 {
                    return Err(invalid("empty attribute"));
                }
                accessors.push(Accessor::Attr(&after[..end]));
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').ok_or_else(|| invalid("missing ']'"))?;
                if end == 0 {
                    return Err(invalid("empty index"));
                }
                accessors.push(Accessor::Item(&after[..end]));
                rest = &after[end + 1..];
                if !rest.is_empty() && !rest.starts_with(['.', '[']) {
                    return Err(invalid("only '.' or '[' may follow ']'"));
                }
            } else {
                return Err(invalid("unexpected character in field path"));
            }
        }

        Ok(Self { first, accessors })
    }
}

fn step(value: &Value, accessor: &Accessor<'_>) -> Option<Value> {
    let value = value.clone().resolved();
    match accessor {
        Accessor::Attr(name) => value.get(name).cloned(),
        Accessor::Item(key) => match (&value, key.parse::<usize>()) {
            (Value::List(items), Ok(index)) => items.get(index).cloned(),
            (Value::Text(s), Ok(index)) => s.chars().nth(index).map(|c| Value::Text(c.to_string())),
            (Value::Map(_), _) => value.get(key).cloned(),
            _ => None,
        },
    }
}

/// Resolves field names for one format call and tracks which arguments
/// were used.
///
/// Nested expansions of the same call share one resolver, so auto-numbering
/// continues across them.
#[derive(Debug)]
pub struct FieldResolver<'a> {
    args: &'a Arguments,
    mode: IndexMode,
    used: HashSet<ArgKey>,
}

impl<'a> FieldResolver<'a> {
    pub fn new(args: &'a Arguments) -> Self {
        Self {
            args,
            mode: IndexMode::default(),
            used: HashSet::new(),
        }
    }

    pub fn args(&self) -> &'a Arguments {
        self.args
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    /// Resolve `field_name` to a concrete value and the key it was found
    /// under.
    ///
    /// Names that do not resolve produce `(Value::Null, Name(field_name))`.
    /// Deferred values are produced here.
    pub fn resolve(&mut self, field_name: &str) -> FormatResult<(Value, ArgKey)> {
        let path = FieldPath::parse(field_name)?;
        let key = self.claim(path.first, field_name)?;

        let base = match &key {
            ArgKey::Index(index) => self.args.get_positional(*index),
            ArgKey::Name(name) => self.args.get_named(name),
        };

        let found = base.cloned().and_then(|base| {
            path.accessors
                .iter()
                .try_fold(base, |value, accessor| step(&value, accessor))
        });

        let (value, key) = match found {
            Some(value) => (value.resolved(), key),
            None => {
                debug!(field = field_name, "Unresolved field, using null");
                (Value::Null, ArgKey::Name(field_name.to_string()))
            }
        };

        self.used.insert(key.clone());
        Ok((value, key))
    }

    /// Turn the first part of a field name into an argument key, applying
    /// auto/manual numbering rules.
    fn claim(&mut self, first: &str, field_name: &str) -> FormatResult<ArgKey> {
        let mix = || FormatError::ManualAutoIndexMix {
            field: field_name.to_string(),
        };

        if first.is_empty() {
            return match self.mode {
                IndexMode::Auto(next) => {
                    self.mode = IndexMode::Auto(next + 1);
                    Ok(ArgKey::Index(next))
                }
                IndexMode::Manual => Err(mix()),
            };
        }

        if first.bytes().all(|b| b.is_ascii_digit()) {
            match self.mode {
                IndexMode::Auto(0) | IndexMode::Manual => self.mode = IndexMode::Manual,
                IndexMode::Auto(_) => return Err(mix()),
            }
            let index = first.parse().map_err(|_| FormatError::InvalidField {
                field: field_name.to_string(),
                message: "index out of range".to_string(),
            })?;
            return Ok(ArgKey::Index(index));
        }

        Ok(ArgKey::Name(first.to_string()))
    }

    /// First positional index never resolved, if any.
    pub fn first_unused_positional(&self) -> Option<usize> {
        (0..self.args.positional().len()).find(|i| !self.used.contains(&ArgKey::Index(*i)))
    }
}
