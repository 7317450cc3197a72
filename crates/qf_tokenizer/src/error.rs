//! Error types for the tokenizer.

use thiserror::Error;

/// Result type alias for tokenizer operations.
pub type TokenizeResult<T> = Result<T, TokenizeError>;

/// Errors that can occur while splitting a template.
///
/// Offsets are byte offsets into the template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Single '}}' encountered in format string at offset {offset}")]
    UnmatchedClosingBrace { offset: usize },

    #[error("Expected '}}' before end of string for field opened at offset {offset}")]
    UnclosedField { offset: usize },

    #[error("End of string while looking for conversion specifier in field at offset {offset}")]
    MissingConversion { offset: usize },

    #[error("Expected ':' after conversion specifier in field at offset {offset}")]
    ExpectedColonAfterConversion { offset: usize },
}
