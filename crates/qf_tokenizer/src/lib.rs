//! # qf_tokenizer
//!
//! Brace tokenizer for query-formatter templates.
//!
//! A template is plain text with embedded field references in braces. The
//! tokenizer splits it into an ordered sequence of [`Chunk`]s, each carrying
//! the literal text that precedes a field and the field itself:
//!
//! - `{name}`, `{name!c}`, `{name:spec}`, `{name!c:spec}`
//! - `{{` and `}}` stand for literal braces
//! - the spec may contain balanced nested braces, so whole sub-templates can
//!   be embedded in it
//!
//! Field names and specs are not validated here.
//!
//! ## Example
//!
//! ```rust
//! use qf_tokenizer::tokenize;
//!
//! let chunks = tokenize("WHERE id = {id} {flag:if:AND active}").unwrap();
//!
//! assert_eq!(chunks[0].literal, "WHERE id = ");
//! assert_eq!(chunks[0].field.as_ref().unwrap().name, "id");
//! assert_eq!(chunks[1].field.as_ref().unwrap().spec, "if:AND active");
//! ```

pub mod error;
pub mod tokenizer;

pub use error::{TokenizeError, TokenizeResult};
pub use tokenizer::{tokenize, Chunk, Field, Tokenizer};
