//! Raw playback action records as delivered by the data source.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::AnalyticsError;

/// Identifier of a user.
pub type UserId = i64;

/// Point in time an action happened, in the data source's integer unit.
pub type Timestamp = i64;

/// A single action by a user on a device.
///
/// `action` is kept as the raw string so that malformed values surface as
/// [`AnalyticsError::InvalidAction`] from the analytics that read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: UserId,
    pub device: String,
    pub action: String,
    pub date_actioned: Timestamp,
}

impl EventRecord {
    pub fn new(
        user_id: UserId,
        device: impl Into<String>,
        action: Action,
        date_actioned: Timestamp,
    ) -> Self {
        Self {
            user_id,
            device: device.into(),
            action: action.as_str().to_string(),
            date_actioned,
        }
    }
}

/// A record that can be filtered and reconstructed into sessions.
///
/// This trait allows the analytics to work with different record
/// representations (e.g., [`EventRecord`] from a snapshot, or test fixtures).
pub trait ActionEvent {
    /// Returns the user who performed the action.
    fn user_id(&self) -> UserId;

    /// Returns the device identifier (e.g., "iPhone", "Windows 10").
    fn device(&self) -> &str;

    /// Returns the raw action string.
    fn action(&self) -> &str;

    /// Returns when the action happened.
    fn date_actioned(&self) -> Timestamp;

    /// Parses the raw action string.
    fn parsed_action(&self) -> Result<Action, AnalyticsError> {
        self.action().parse()
    }
}

impl ActionEvent for EventRecord {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn device(&self) -> &str {
        &self.device
    }

    fn action(&self) -> &str {
        &self.action
    }

    fn date_actioned(&self) -> Timestamp {
        self.date_actioned
    }
}

impl<E: ActionEvent> ActionEvent for &E {
    fn user_id(&self) -> UserId {
        (*self).user_id()
    }

    fn device(&self) -> &str {
        (*self).device()
    }

    fn action(&self) -> &str {
        (*self).action()
    }

    fn date_actioned(&self) -> Timestamp {
        (*self).date_actioned()
    }
}
