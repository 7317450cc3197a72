//! Render command - Format a template against arguments.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use qf_core::{Arguments, Value};

use crate::config::{EscaperKind, QfConfig};
use crate::input::{load_args_file, parse_named, parse_typed};

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Template text, or '-' to read it from stdin
    template: String,

    /// JSON or YAML file with arguments
    #[arg(short, long)]
    args_file: Option<PathBuf>,

    /// Positional text value (repeatable)
    #[arg(short = 'p', long = "positional", value_name = "VALUE")]
    positional: Vec<String>,

    /// Named text value as KEY=VALUE (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Named typed value as KEY=TYPE:VALUE (repeatable)
    #[arg(short = 't', long = "typed", value_name = "KEY=TYPE:VALUE")]
    typed: Vec<String>,

    /// Format values as-is instead of escaping them
    #[arg(long)]
    no_escape: bool,

    /// Override the recursion budget
    #[arg(long)]
    max_depth: Option<i32>,
}

pub fn execute(args: RenderArgs, config: QfConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let output = render(&args, &template, config)?;
    println!("{}", output);
    Ok(())
}

fn read_template(template: &str) -> Result<String> {
    if template != "-" {
        return Ok(template.to_string());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read template from stdin")?;
    Ok(buffer)
}

/// Collect arguments: the file first, then command-line values on top.
fn collect_arguments(args: &RenderArgs) -> Result<Arguments> {
    let mut arguments = match &args.args_file {
        Some(path) => load_args_file(path)?,
        None => Arguments::new(),
    };

    for value in &args.positional {
        arguments.push(Value::from(value.as_str()));
    }
    for arg in &args.set {
        let (key, value) = parse_named(arg)?;
        arguments.insert(key, value);
    }
    for arg in &args.typed {
        let (key, value) = parse_typed(arg)?;
        arguments.insert(key, value);
    }

    debug!(
        positional = arguments.positional().len(),
        named = arguments.named().len(),
        "Collected arguments"
    );
    Ok(arguments)
}

fn render(args: &RenderArgs, template: &str, mut config: QfConfig) -> Result<String> {
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if args.no_escape {
        config = config.with_escaper(EscaperKind::None);
    }

    let arguments = collect_arguments(args)?;
    let formatter = config.formatter();
    info!("Rendering template ({} bytes)", template.len());

    formatter
        .format(template, &arguments)
        .context("Failed to render template")
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_core::FormatError;
    use tempfile::tempdir;

    fn args(template: &str) -> RenderArgs {
        RenderArgs {
            template: template.to_string(),
            ..Default::default()
        }
    }

    fn run(args: &RenderArgs) -> Result<String> {
        render(args, &args.template, QfConfig::default())
    }

    #[test]
    fn test_render_with_set_and_typed() {
        let mut a = args("WHERE name = '{name}'{since:if: AND created > {since}}");
        a.set = vec!["name=O'Hara".to_string()];
        a.typed = vec!["since=date:2024-01-01".to_string()];

        assert_eq!(
            run(&a).unwrap(),
            "WHERE name = 'O''Hara' AND created > '2024-01-01'::date"
        );
    }

    #[test]
    fn test_render_positional() {
        let mut a = args("{} {}");
        a.positional = vec!["a".to_string(), "b".to_string()];
        assert_eq!(run(&a).unwrap(), "a b");
    }

    #[test]
    fn test_command_line_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("args.json");
        std::fs::write(&path, r#"{"x": "file", "y": "kept"}"#).unwrap();

        let mut a = args("{x} {y}");
        a.args_file = Some(path);
        a.set = vec!["x=flag".to_string()];
        assert_eq!(run(&a).unwrap(), "flag kept");
    }

    #[test]
    fn test_no_escape() {
        let mut a = args("{v}");
        a.set = vec!["v=it's".to_string()];
        a.no_escape = true;
        assert_eq!(run(&a).unwrap(), "it's");
    }

    #[test]
    fn test_max_depth_override() {
        let mut a = args("{a}");
        a.set = vec!["a={b}".to_string(), "b=end".to_string()];
        assert_eq!(run(&a).unwrap(), "end");

        a.max_depth = Some(0);
        let err = run(&a).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::RecursionLimit { limit: 0 })
        ));
    }

    #[test]
    fn test_literal_template_is_not_read_from_stdin() {
        assert_eq!(read_template("SELECT 1").unwrap(), "SELECT 1");
    }
}
