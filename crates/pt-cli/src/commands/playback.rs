//! Playback command for a single user's total playback time.

use std::io::Write;

use anyhow::Result;
use pt_core::{
    EventRecord, OrderingPolicy, Timestamp, UsageSession, UserId, finished_duration,
    reconstruct_sessions,
};
use serde::Serialize;

use super::util::format_duration;

/// JSON shape of the playback command.
#[derive(Debug, Serialize)]
struct PlaybackOutput<'a> {
    user_id: UserId,
    playback: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    sessions: Option<&'a [UsageSession]>,
}

/// Runs the playback command.
pub fn run<W: Write>(
    writer: &mut W,
    records: &[EventRecord],
    user_id: UserId,
    ordering: OrderingPolicy,
    show_sessions: bool,
    json: bool,
) -> Result<()> {
    let sessions = reconstruct_sessions(user_id, records, ordering)?;
    let playback = finished_duration(user_id, &sessions)?;

    if json {
        let output = PlaybackOutput {
            user_id,
            playback,
            sessions: show_sessions.then_some(sessions.as_slice()),
        };
        writeln!(writer, "{}", serde_json::to_string(&output)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "User {user_id} playback: {playback} ({})",
        format_duration(playback)
    )?;

    if show_sessions {
        if sessions.is_empty() {
            writeln!(writer, "No sessions.")?;
            return Ok(());
        }
        writeln!(writer, "Sessions:")?;
        for session in &sessions {
            if let (true, Some(duration)) = (session.finished, session.duration()) {
                writeln!(
                    writer,
                    "- {} -> {}: {duration}",
                    session.start, session.stop
                )?;
            } else {
                writeln!(
                    writer,
                    "- {} -> {}: open, not counted",
                    session.start, session.stop
                )?;
            }
        }
    }

    Ok(())
}
