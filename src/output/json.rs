//! JSON output

use std::io;

use serde::Serialize;

/// Render a value as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

/// Print a value as pretty-printed JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let json = to_json(value)?;
    println!("{}", json);
    Ok(())
}
