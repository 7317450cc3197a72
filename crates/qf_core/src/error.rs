//! Error types for query formatting.

use thiserror::Error;

/// Result type alias for formatter operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while formatting a template.
///
/// Every variant is fatal to the whole `format` call.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Could not cast \"{value}\" to type \"{target}\"")]
    TypeCast { value: String, target: String },

    #[error("Type \"{kind}\" unsupported yet (value: {value})")]
    UnsupportedType { kind: String, value: String },

    #[error("Max string recursion exceeded (limit {limit})")]
    RecursionLimit { limit: i32 },

    #[error("Error during processing variable \"{field}\" with value \"{value}\" in template:\n{template}")]
    FieldFormatting {
        field: String,
        value: String,
        template: String,
        #[source]
        source: Box<FormatError>,
    },

    #[error("Positional argument {index} was never used")]
    UnusedArgument { index: usize },

    #[error("Cannot switch between manual field specification and automatic field numbering (field \"{field}\")")]
    ManualAutoIndexMix { field: String },

    #[error("Invalid \"{directive}\" directive: {message}")]
    InvalidDirective { directive: String, message: String },

    #[error("Invalid format specifier \"{spec}\" for value of type \"{kind}\"")]
    InvalidFormatSpec { spec: String, kind: String },

    #[error("Unknown conversion specifier '{0}'")]
    InvalidConversion(char),

    #[error("Invalid field reference \"{field}\": {message}")]
    InvalidField { field: String, message: String },

    #[error("Cannot compare values of type \"{left}\" and \"{right}\"")]
    Incomparable { left: String, right: String },

    #[error("Template syntax error: {0}")]
    Tokenize(#[from] qf_tokenizer::TokenizeError),
}

impl FormatError {
    pub(crate) fn directive(directive: &str, message: impl Into<String>) -> Self {
        Self::InvalidDirective {
            directive: directive.to_string(),
            message: message.into(),
        }
    }

    /// Innermost error behind any `FieldFormatting` wrappers.
    pub fn root_cause(&self) -> &FormatError {
        let mut current = self;
        while let Self::FieldFormatting { source, .. } = current {
            current = source;
        }
        current
    }
}
