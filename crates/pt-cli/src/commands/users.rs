//! Users command for listing who performed an action at an exact time.

use std::io::Write;

use anyhow::Result;
use pt_core::{EventRecord, Timestamp, select_users};

/// Runs the users command.
pub fn run<W: Write>(
    writer: &mut W,
    records: &[EventRecord],
    action: &str,
    start: Timestamp,
    stop: Timestamp,
    json: bool,
) -> Result<()> {
    let users = select_users(records, action, start, stop)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string(&users)?)?;
        return Ok(());
    }

    let at = if action == "stop" { stop } else { start };
    if users.is_empty() {
        writeln!(writer, "No users with {action} at {at}.")?;
    } else {
        let ids: Vec<String> = users.iter().map(ToString::to_string).collect();
        writeln!(writer, "Users with {action} at {at}: {}", ids.join(", "))?;
    }

    Ok(())
}
