//! Argument files and command-line argument parsing.
//!
//! An argument file is a JSON (`.json`) or YAML (`.yaml`, `.yml`) document.
//! Its top level is either a map of named values or an object holding only
//! `positional` (a list) and/or `named` (a map).

use std::path::{Path, PathBuf};

use qf_core::{cast_to_type, Arguments, FormatError, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read argument file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in argument file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in argument file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported argument file extension: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid argument file {path}: {message}")]
    Shape { path: PathBuf, message: String },

    #[error("Invalid argument '{arg}': expected {expected}")]
    Malformed { arg: String, expected: &'static str },

    #[error("Invalid argument '{arg}': {source}")]
    Cast {
        arg: String,
        #[source]
        source: FormatError,
    },
}

/// Load an argument file into a fresh context.
pub fn load_args_file(path: &Path) -> Result<Arguments, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let document: JsonValue = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|source| InputError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(InputError::UnsupportedFormat(path.to_path_buf())),
    };

    arguments_from_document(document).map_err(|message| InputError::Shape {
        path: path.to_path_buf(),
        message,
    })
}

fn arguments_from_document(document: JsonValue) -> Result<Arguments, String> {
    let JsonValue::Object(mut entries) = document else {
        return Err("top level must be a map".to_string());
    };

    let structured = !entries.is_empty()
        && entries.keys().all(|k| k == "positional" || k == "named")
        && entries.get("positional").map_or(true, JsonValue::is_array)
        && entries.get("named").map_or(true, JsonValue::is_object);

    let mut args = Arguments::new();
    if !structured {
        for (key, value) in entries {
            args.insert(key, Value::from(value));
        }
        return Ok(args);
    }

    if let Some(JsonValue::Array(items)) = entries.remove("positional") {
        for item in items {
            args.push(Value::from(item));
        }
    }
    if let Some(JsonValue::Object(named)) = entries.remove("named") {
        for (key, value) in named {
            args.insert(key, Value::from(value));
        }
    }
    Ok(args)
}

/// Parse `KEY=VALUE` into a named text value.
pub fn parse_named(arg: &str) -> Result<(String, Value), InputError> {
    let (key, value) = split_key(arg, "KEY=VALUE")?;
    Ok((key.to_string(), Value::from(value)))
}

/// Parse `KEY=TYPE:VALUE`, casting the literal to `TYPE`.
pub fn parse_typed(arg: &str) -> Result<(String, Value), InputError> {
    let (key, typed) = split_key(arg, "KEY=TYPE:VALUE")?;
    let (type_name, literal) = typed.split_once(':').ok_or_else(|| InputError::Malformed {
        arg: arg.to_string(),
        expected: "KEY=TYPE:VALUE",
    })?;

    let value = cast_to_type(literal, type_name).map_err(|source| InputError::Cast {
        arg: arg.to_string(),
        source,
    })?;
    Ok((key.to_string(), value))
}

fn split_key<'a>(arg: &'a str, expected: &'static str) -> Result<(&'a str, &'a str), InputError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(InputError::Malformed {
            arg: arg.to_string(),
            expected,
        }),
    }
}
