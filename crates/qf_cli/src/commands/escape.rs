//! Escape command - Cast a literal and print its escaped form.

use anyhow::Result;
use clap::Args;
use tracing::info;

use qf_core::{cast_to_type, Escaper, SqlEscaper};

use crate::input::InputError;

#[derive(Args, Debug)]
pub struct EscapeArgs {
    /// Target type: str, int, date, datetime, time, bool or null
    #[arg(value_name = "TYPE")]
    type_name: String,

    /// Literal to cast
    value: String,

    /// Print a condition such as "col =" applied to the value instead
    #[arg(short, long)]
    condition: Option<String>,
}

pub fn execute(args: EscapeArgs) -> Result<()> {
    println!("{}", escape(&args)?);
    Ok(())
}

fn escape(args: &EscapeArgs) -> Result<String> {
    info!("Escaping '{}' as {}", args.value, args.type_name);

    let value = cast_to_type(&args.value, &args.type_name).map_err(|source| InputError::Cast {
        arg: args.value.clone(),
        source,
    })?;
    let escaper = SqlEscaper;

    let out = match &args.condition {
        Some(condition) => escaper.get_condition(&value, condition)?,
        None => escaper.escape_literal(&value)?,
    };
    Ok(out)
}
