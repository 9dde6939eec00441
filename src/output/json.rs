use anyhow::{Context, Result};
use serde::Serialize;

/// Render a view as pretty JSON. Dates serialize as `YYYY-MM-DD`,
/// timestamps as RFC 3339.
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Pretty-print a view as JSON to stdout for `--json`.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", to_pretty(value)?);
    Ok(())
}
