//! Integration tests for the brace tokenizer.

use qf_tokenizer::{tokenize, Tokenizer, TokenizeError};

#[test]
fn test_query_template() {
    let template = "SELECT * FROM t WHERE TRUE {a:if:AND a = {a}} {b:!in:x,y:AND b IS NULL}";
    let chunks = tokenize(template).unwrap();

    let fields: Vec<_> = chunks
        .iter()
        .filter_map(|c| c.field)
        .map(|f| (f.name, f.spec))
        .collect();

    assert_eq!(
        fields,
        vec![("a", "if:AND a = {a}"), ("b", "!in:x,y:AND b IS NULL")]
    );
    assert_eq!(chunks[0].literal, "SELECT * FROM t WHERE TRUE ");
    assert_eq!(chunks[1].literal, " ");
}

#[test]
fn test_reconstructs_literals() {
    let template = "a {{b}} c";
    let literal: String = tokenize(template)
        .unwrap()
        .into_iter()
        .map(|c| c.literal)
        .collect();
    assert_eq!(literal, "a {b} c");
}

#[test]
fn test_restartable() {
    let template = "{x}-{y}";
    let first: Vec<_> = Tokenizer::new(template).collect();
    let second: Vec<_> = Tokenizer::new(template).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_deeply_nested_spec() {
    let chunks = tokenize("{a:include}{b:repeat: OR :({item:repeat:,:{item}})}").unwrap();
    assert_eq!(chunks.len(), 2);
    let f = chunks[1].field.unwrap();
    assert_eq!(f.spec, "repeat: OR :({item:repeat:,:{item}})");
}

#[test]
fn test_unbalanced_nested_spec() {
    let err = tokenize("x {a:if:{b}").unwrap_err();
    assert_eq!(err, TokenizeError::UnclosedField { offset: 2 });
    assert!(err.to_string().contains("offset 2"));
}

#[test]
fn test_conversion_only() {
    let f = tokenize("{name!s}").unwrap()[0].field.unwrap();
    assert_eq!(f.conversion, Some('s'));
    assert_eq!(f.spec, "");
}
