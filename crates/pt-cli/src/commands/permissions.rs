//! Permissions command for a user's per-app feature access.

use std::io::Write;

use anyhow::Result;
use pt_core::{UserId, permissions_for_user};
use pt_data::Snapshot;

/// Runs the permissions command, printing the permissions object as JSON.
pub fn run<W: Write>(writer: &mut W, snapshot: &Snapshot, user_id: UserId) -> Result<()> {
    let permissions = permissions_for_user(
        user_id,
        &snapshot.user_apps,
        &snapshot.app_features,
        &snapshot.user_features,
    )?;
    writeln!(writer, "{}", serde_json::to_string_pretty(&permissions)?)?;
    Ok(())
}
