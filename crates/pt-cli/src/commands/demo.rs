//! Demo command running each analysis with the sample arguments.

use std::io::Write;

use anyhow::Result;
use pt_core::{OrderingPolicy, permissions_for_user, playback_duration_with, select_users};
use pt_data::Snapshot;

const DEMO_ACTION: &str = "start";
const DEMO_START: i64 = 700;
const DEMO_STOP: i64 = 900;
const DEMO_USER: i64 = 1;

/// Runs the demo command.
pub fn run<W: Write>(writer: &mut W, snapshot: &Snapshot, ordering: OrderingPolicy) -> Result<()> {
    let users = select_users(&snapshot.actions, DEMO_ACTION, DEMO_START, DEMO_STOP)?;
    writeln!(
        writer,
        "select_users({DEMO_ACTION:?}, {DEMO_START}, {DEMO_STOP}): {users:?}"
    )?;

    let playback = playback_duration_with(DEMO_USER, &snapshot.actions, ordering)?;
    writeln!(writer, "playback_duration({DEMO_USER}): {playback}")?;

    let permissions = permissions_for_user(
        DEMO_USER,
        &snapshot.user_apps,
        &snapshot.app_features,
        &snapshot.user_features,
    )?;
    writeln!(
        writer,
        "permissions_for_user({DEMO_USER}): {}",
        serde_json::to_string(&permissions)?
    )?;

    Ok(())
}
