//! Report command for playback time across all users.

use std::io::Write;

use anyhow::Result;
use pt_core::{EventRecord, OrderingPolicy, Timestamp, UserId, UserPlayback, playback_report};
use serde::Serialize;

use super::util::{format_duration, progress_bar};

/// JSON entry for one user.
#[derive(Debug, Serialize)]
struct ReportEntry {
    user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    playback: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&UserPlayback> for ReportEntry {
    fn from(entry: &UserPlayback) -> Self {
        match &entry.result {
            Ok(playback) => Self {
                user_id: entry.user_id,
                playback: Some(*playback),
                error: None,
            },
            Err(err) => Self {
                user_id: entry.user_id,
                playback: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Formats the report as human-readable text.
pub fn format_report(entries: &[UserPlayback]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    let _ = writeln!(output, "PLAYBACK REPORT ({} users)", entries.len());

    if entries.is_empty() {
        let _ = writeln!(output, "No actions recorded.");
        return output;
    }

    let max = entries
        .iter()
        .filter_map(|e| e.result.as_ref().ok())
        .copied()
        .max()
        .unwrap_or(0);

    let _ = writeln!(output);
    for entry in entries {
        match &entry.result {
            Ok(playback) => {
                let _ = writeln!(
                    output,
                    "  user {:<6} {} {:>8}  {}",
                    entry.user_id,
                    progress_bar(*playback, max),
                    playback,
                    format_duration(*playback)
                );
            }
            Err(err) => {
                let _ = writeln!(output, "  user {:<6} error: {err}", entry.user_id);
            }
        }
    }

    output
}

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    records: &[EventRecord],
    ordering: OrderingPolicy,
    json: bool,
) -> Result<()> {
    let entries = playback_report(records, ordering);

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    if failed > 0 {
        tracing::warn!(failed, "playback could not be computed for some users");
    }

    if json {
        let entries: Vec<ReportEntry> = entries.iter().map(ReportEntry::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_report(&entries))?;
    }

    Ok(())
}
