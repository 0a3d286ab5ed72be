//! Errors raised by the analytics functions.

use thiserror::Error;

use crate::record::{Timestamp, UserId};

/// Analytics errors.
///
/// Every variant aborts the computation that raised it; no partial result is
/// returned alongside an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// An action string other than `start` or `stop`.
    #[error("invalid action {value:?}: expected \"start\" or \"stop\"")]
    InvalidAction { value: String },

    /// A `stop` for a device with no open `start` in the user's stream.
    #[error("user {user_id} stopped device {device:?} at {date_actioned} without starting it")]
    DeviceNotStarted {
        user_id: UserId,
        device: String,
        date_actioned: Timestamp,
    },

    /// No entitlement record exists for the user.
    #[error("no feature entitlements found for user {user_id}")]
    UserNotFound { user_id: UserId },

    /// The user's events are not in chronological order.
    #[error("events for user {user_id} are out of order: {current} follows {previous}")]
    EventsOutOfOrder {
        user_id: UserId,
        previous: Timestamp,
        current: Timestamp,
    },

    /// The user's playback time does not fit in a timestamp.
    #[error("playback time for user {user_id} overflows")]
    DurationOverflow { user_id: UserId },
}
