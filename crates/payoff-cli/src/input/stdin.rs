use serde_json::Value;
use std::io::{self, Read};

/// Read a JSON document piped into the command.
///
/// Returns `Ok(None)` when there is nothing to consume: stdin is an
/// interactive terminal, or the pipe carried only whitespace. Commands
/// fall back to their flags (or report a missing input) in that case.
pub fn read_piped() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;

    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(raw)?))
}
