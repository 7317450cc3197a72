//! CLI command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod escape;
pub mod render;

/// qf - query templates with escaped literals
#[derive(Parser)]
#[command(name = "qf")]
#[command(version, about = "Render query templates with escaped literals")]
#[command(long_about = r#"
qf renders query templates: text with {field:directive} placeholders that
are resolved against positional and named arguments. Values are escaped as
SQL literals; directives such as if, in, eq, repeat and include add
optional fragments.

COMMANDS:
  render  → Render a template
  escape  → Cast a literal and print its escaped form

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./qf.toml when present)
    #[arg(long, global = true, env = "QF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template against arguments
    Render(render::RenderArgs),

    /// Cast a literal to a type and print its escaped form
    Escape(escape::EscapeArgs),
}
