//! Selecting users by the action they performed at a point in time.

use std::collections::BTreeSet;

use crate::action::Action;
use crate::error::AnalyticsError;
use crate::record::{ActionEvent, Timestamp, UserId};

/// Returns the distinct users whose records match `action` at its bound.
///
/// For `start`, a record matches when it is a `start` whose `date_actioned`
/// equals `start` exactly. For `stop`, it must be a `stop` at exactly `stop`.
/// The bound belonging to the other action is not consulted.
///
/// Records with an unrecognised action string never match; only the
/// requested `action` is validated.
pub fn users_matching<E: ActionEvent>(
    records: &[E],
    action: &str,
    start: Timestamp,
    stop: Timestamp,
) -> Result<BTreeSet<UserId>, AnalyticsError> {
    let action: Action = action.parse()?;
    let bound = match action {
        Action::Start => start,
        Action::Stop => stop,
    };

    Ok(records
        .iter()
        .filter(|r| r.action() == action.as_str() && r.date_actioned() == bound)
        .map(ActionEvent::user_id)
        .collect())
}

/// List-returning form of [`users_matching`], ordered by user id.
pub fn select_users<E: ActionEvent>(
    records: &[E],
    action: &str,
    start: Timestamp,
    stop: Timestamp,
) -> Result<Vec<UserId>, AnalyticsError> {
    let users = users_matching(records, action, start, stop)?;
    tracing::debug!(action, start, stop, matched = users.len(), "selected users");
    Ok(users.into_iter().collect())
}
