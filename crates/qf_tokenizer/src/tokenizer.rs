//! Template tokenization.

use tracing::trace;

use crate::error::{TokenizeError, TokenizeResult};

/// A field reference found between braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Field name, possibly empty (auto-numbered) or a path like `a.b[0]`
    pub name: &'a str,
    /// Conversion character following `!`
    pub conversion: Option<char>,
    /// Everything after the first `:`, verbatim
    pub spec: &'a str,
}

/// One piece of a template: literal text optionally followed by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub literal: &'a str,
    pub field: Option<Field<'a>>,
}

impl<'a> Chunk<'a> {
    fn literal(literal: &'a str) -> Self {
        Self {
            literal,
            field: None,
        }
    }
}

/// Lazy iterator over the chunks of a template.
///
/// Tokenizing is cheap and has no side effects, so walking a template again
/// is just a matter of calling [`Tokenizer::new`] once more. Iteration stops
/// after the first error.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            done: false,
        }
    }

    fn next_chunk(&mut self) -> TokenizeResult<Option<Chunk<'a>>> {
        let src = self.source;
        let bytes = src.as_bytes();
        let start = self.pos;

        if start >= bytes.len() {
            return Ok(None);
        }

        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    if bytes.get(i + 1) == Some(&b'{') {
                        // Doubled brace: emit text up to and including one brace
                        self.pos = i + 2;
                        return Ok(Some(Chunk::literal(&src[start..=i])));
                    }

                    let literal = &src[start..i];
                    let (field, end) = parse_field(src, i)?;
                    trace!(name = field.name, spec = field.spec, "tokenized field");
                    self.pos = end;
                    return Ok(Some(Chunk {
                        literal,
                        field: Some(field),
                    }));
                }
                b'}' => {
                    if bytes.get(i + 1) == Some(&b'}') {
                        self.pos = i + 2;
                        return Ok(Some(Chunk::literal(&src[start..=i])));
                    }
                    return Err(TokenizeError::UnmatchedClosingBrace { offset: i });
                }
                _ => i += 1,
            }
        }

        self.pos = bytes.len();
        Ok(Some(Chunk::literal(&src[start..])))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = TokenizeResult<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Split a whole template into chunks.
pub fn tokenize(source: &str) -> TokenizeResult<Vec<Chunk<'_>>> {
    Tokenizer::new(source).collect()
}

/// Parse the field opened at byte `open`, returning it with the offset just
/// past its closing brace.
fn parse_field(src: &str, open: usize) -> TokenizeResult<(Field<'_>, usize)> {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut close = open + 1;

    while close < bytes.len() {
        match bytes[close] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        close += 1;
    }

    if close >= bytes.len() {
        return Err(TokenizeError::UnclosedField { offset: open });
    }

    let field = split_field(&src[open + 1..close], open)?;
    Ok((field, close + 1))
}

/// Split the text between the braces into name, conversion and spec.
fn split_field(inner: &str, offset: usize) -> TokenizeResult<Field<'_>> {
    let bytes = inner.as_bytes();
    let mut in_brackets = false;
    let mut end = 0;

    while end < bytes.len() {
        match bytes[end] {
            b'[' => in_brackets = true,
            b']' => in_brackets = false,
            b':' | b'!' if !in_brackets => break,
            _ => {}
        }
        end += 1;
    }

    let name = &inner[..end];
    if end == bytes.len() {
        return Ok(Field {
            name,
            conversion: None,
            spec: "",
        });
    }

    if bytes[end] == b':' {
        return Ok(Field {
            name,
            conversion: None,
            spec: &inner[end + 1..],
        });
    }

    let mut rest = inner[end + 1..].chars();
    let conversion = rest
        .next()
        .ok_or(TokenizeError::MissingConversion { offset })?;
    let after = rest.as_str();

    let spec = if after.is_empty() {
        ""
    } else if let Some(spec) = after.strip_prefix(':') {
        spec
    } else {
        return Err(TokenizeError::ExpectedColonAfterConversion { offset });
    };

    Ok(Field {
        name,
        conversion: Some(conversion),
        spec,
    })
}
