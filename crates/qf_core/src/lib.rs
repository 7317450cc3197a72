//! # qf_core
//!
//! Query templating with type-directed literal escaping.
//!
//! A single template describes a query together with its optional parts.
//! Fields in braces are resolved against positional and named arguments and
//! rendered through a directive chosen by the field's format spec:
//!
//! - plain fields are escaped as SQL literals (`'...'::date`, `NULL`, ...)
//! - `if`, `in`, `eq`, `gt`, `exists` and their negations emit a fragment
//!   only when a condition holds
//! - `repeat` and `include` render sub-templates
//!
//! Conditional fragments may reference other fields; they are expanded
//! recursively up to a fixed depth.
//!
//! ## Example
//!
//! ```rust
//! use qf_core::{Arguments, QueryFormatter, Value};
//!
//! let formatter = QueryFormatter::sql();
//! let args = Arguments::new()
//!     .with_named("name", "O'Brien")
//!     .with_named("ids", vec![1, 2, 3])
//!     .with_named("archived", Value::Null);
//!
//! let query = formatter
//!     .format(
//!         "SELECT * FROM users WHERE name = '{name}'\
//!          {ids:if: AND id IN ({ids})}\
//!          {archived:if: AND archived}",
//!         &args,
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     query,
//!     "SELECT * FROM users WHERE name = 'O''Brien' AND id IN (1, 2, 3)"
//! );
//! ```

pub mod arguments;
pub mod cast;
pub mod directive;
pub mod error;
pub mod escape;
pub mod format_spec;
pub mod formatter;
pub mod resolver;
pub mod value;

pub use arguments::Arguments;
pub use cast::{cast_to_type, CastType};
pub use directive::{Condition, Directive, DirectiveKind};
pub use error::{FormatError, FormatResult};
pub use escape::{quote_identifier, Escaper, SqlEscaper};
pub use format_spec::format_value;
pub use formatter::{Fragment, FormatterOptions, QueryFormatter, DEFAULT_MAX_DEPTH};
pub use resolver::{ArgKey, FieldResolver, IndexMode};
pub use value::{Deferred, Value};
