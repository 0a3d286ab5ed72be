//! Playback time reconstruction.
//!
//! Merges a user's per-device start/stop actions into usage sessions and sums
//! the time spent in them.
//!
//! # Algorithm Summary
//!
//! 1. Walk the user's events in chronological order, tracking which devices
//!    are currently started and when
//! 2. A `start` with no open session opens one; a `stop` moves the open
//!    session's end and closes the session once no device remains started
//! 3. Sum the durations of finished sessions; sessions still open when the
//!    stream ends contribute nothing
//!
//! Overlapping activity on several devices therefore counts once, from the
//! first start to the last stop.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::AnalyticsError;
use crate::record::{ActionEvent, Timestamp, UserId};

/// How a user's events are ordered before reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// Input order must already be chronological; a decreasing timestamp
    /// fails with [`AnalyticsError::EventsOutOfOrder`].
    #[default]
    Strict,
    /// Events are stable-sorted by timestamp first. Ties keep input order.
    Sort,
}

/// A maximal interval during which at least one device was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSession {
    /// Timestamp of the first `start` in the session.
    pub start: Timestamp,
    /// Timestamp of the latest `stop` seen so far.
    pub stop: Timestamp,
    /// Whether every device started in this session has stopped.
    pub finished: bool,
}

impl UsageSession {
    const fn open_at(at: Timestamp) -> Self {
        Self {
            start: at,
            stop: at,
            finished: false,
        }
    }

    /// Length of the session, or `None` if it does not fit in a [`Timestamp`].
    pub const fn duration(&self) -> Option<Timestamp> {
        self.stop.checked_sub(self.start)
    }
}

/// Working state for one reconstruction pass over a single user's events.
#[derive(Debug)]
struct Reconstruction {
    user_id: UserId,
    /// Device -> when its currently open interval began.
    started_devices: HashMap<String, Timestamp>,
    sessions: Vec<UsageSession>,
    /// Last timestamp seen, when order is being checked.
    last_seen: Option<Timestamp>,
    check_order: bool,
}

impl Reconstruction {
    fn new(user_id: UserId, check_order: bool) -> Self {
        Self {
            user_id,
            started_devices: HashMap::new(),
            sessions: Vec::new(),
            last_seen: None,
            check_order,
        }
    }

    fn apply<E: ActionEvent>(&mut self, event: &E) -> Result<(), AnalyticsError> {
        let action = event.parsed_action()?;
        let at = event.date_actioned();

        if self.check_order {
            if let Some(previous) = self.last_seen.filter(|&previous| at < previous) {
                return Err(AnalyticsError::EventsOutOfOrder {
                    user_id: self.user_id,
                    previous,
                    current: at,
                });
            }
            self.last_seen = Some(at);
        }

        match action {
            Action::Start => {
                self.started_devices.insert(event.device().to_string(), at);

                if self.sessions.last().is_none_or(|s| s.finished) {
                    self.sessions.push(UsageSession::open_at(at));
                    tracing::trace!(user_id = self.user_id, at, "opened session");
                }
            }
            Action::Stop => {
                if self.started_devices.remove(event.device()).is_none() {
                    return Err(AnalyticsError::DeviceNotStarted {
                        user_id: self.user_id,
                        device: event.device().to_string(),
                        date_actioned: at,
                    });
                }

                // A started device implies an open session exists
                if let Some(session) = self.sessions.last_mut() {
                    session.stop = at;
                    if self.started_devices.is_empty() {
                        session.finished = true;
                        tracing::trace!(
                            user_id = self.user_id,
                            start = session.start,
                            stop = session.stop,
                            "closed session"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Vec<UsageSession> {
        if !self.started_devices.is_empty() {
            tracing::debug!(
                user_id = self.user_id,
                devices = ?self.started_devices.keys().collect::<Vec<_>>(),
                "devices still started at end of stream"
            );
        }
        self.sessions
    }
}

/// Rebuilds the usage sessions of `user_id` from `records`.
///
/// Only records belonging to `user_id` are considered. Their input order must
/// be chronological; see [`OrderingPolicy`] for the alternatives.
///
/// Sessions left open at the end of the stream are included with
/// `finished == false`.
pub fn reconstruct_sessions<E: ActionEvent>(
    user_id: UserId,
    records: &[E],
    policy: OrderingPolicy,
) -> Result<Vec<UsageSession>, AnalyticsError> {
    let mut events: Vec<&E> = records.iter().filter(|r| r.user_id() == user_id).collect();

    let check_order = match policy {
        OrderingPolicy::Strict => true,
        OrderingPolicy::Sort => {
            events.sort_by_key(|e| e.date_actioned());
            false
        }
    };

    let mut pass = Reconstruction::new(user_id, check_order);
    for event in events {
        pass.apply(event)?;
    }
    Ok(pass.finish())
}

/// Sums the durations of `user_id`'s finished sessions.
///
/// Open sessions are dropped from the total. A total that does not fit in a
/// [`Timestamp`] fails with [`AnalyticsError::DurationOverflow`].
pub fn finished_duration(
    user_id: UserId,
    sessions: &[UsageSession],
) -> Result<Timestamp, AnalyticsError> {
    let open = sessions.iter().filter(|s| !s.finished).count();
    if open > 0 {
        tracing::debug!(user_id, open, "excluding unfinished sessions from playback time");
    }

    sessions
        .iter()
        .filter(|s| s.finished)
        .try_fold(0, |total: Timestamp, session| {
            session.duration().and_then(|d| total.checked_add(d))
        })
        .ok_or(AnalyticsError::DurationOverflow { user_id })
}

/// Total playback time of `user_id` across all devices.
///
/// Input order must be chronological for the user's events; a decreasing
/// timestamp fails with [`AnalyticsError::EventsOutOfOrder`].
pub fn playback_duration<E: ActionEvent>(
    user_id: UserId,
    records: &[E],
) -> Result<Timestamp, AnalyticsError> {
    playback_duration_with(user_id, records, OrderingPolicy::Strict)
}

/// Like [`playback_duration`], but sorts the user's events by timestamp first.
pub fn playback_duration_sorted<E: ActionEvent>(
    user_id: UserId,
    records: &[E],
) -> Result<Timestamp, AnalyticsError> {
    playback_duration_with(user_id, records, OrderingPolicy::Sort)
}

/// Total playback time of `user_id` under an explicit ordering policy.
pub fn playback_duration_with<E: ActionEvent>(
    user_id: UserId,
    records: &[E],
    policy: OrderingPolicy,
) -> Result<Timestamp, AnalyticsError> {
    let sessions = reconstruct_sessions(user_id, records, policy)?;
    let total = finished_duration(user_id, &sessions)?;
    tracing::debug!(user_id, sessions = sessions.len(), total, "computed playback time");
    Ok(total)
}

/// Playback result for one user in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPlayback {
    pub user_id: UserId,
    pub result: Result<Timestamp, AnalyticsError>,
}

/// Computes playback time for every user present in `records`.
///
/// Users are processed in parallel. An error for one user is recorded in that
/// user's entry and does not affect the others. Entries are ordered by user id.
pub fn playback_report<E: ActionEvent + Sync>(
    records: &[E],
    policy: OrderingPolicy,
) -> Vec<UserPlayback> {
    let mut by_user: BTreeMap<UserId, Vec<&E>> = BTreeMap::new();
    for record in records {
        by_user.entry(record.user_id()).or_default().push(record);
    }

    let users: Vec<(UserId, Vec<&E>)> = by_user.into_iter().collect();
    users
        .par_iter()
        .map(|(user_id, events)| UserPlayback {
            user_id: *user_id,
            result: playback_duration_with(*user_id, events, policy),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventRecord;

    /// Test event implementation.
    struct TestEvent {
        user_id: UserId,
        device: &'static str,
        action: &'static str,
        at: Timestamp,
    }

    impl ActionEvent for TestEvent {
        fn user_id(&self) -> UserId {
            self.user_id
        }

        fn device(&self) -> &str {
            self.device
        }

        fn action(&self) -> &str {
            self.action
        }

        fn date_actioned(&self) -> Timestamp {
            self.at
        }
    }

    fn start(device: &'static str, at: Timestamp) -> TestEvent {
        TestEvent {
            user_id: 1,
            device,
            action: "start",
            at,
        }
    }

    fn stop(device: &'static str, at: Timestamp) -> TestEvent {
        TestEvent {
            user_id: 1,
            device,
            action: "stop",
            at,
        }
    }

    fn for_user(user_id: UserId, mut event: TestEvent) -> TestEvent {
        event.user_id = user_id;
        event
    }

    #[test]
    fn test_single_device_pair() {
        let events = [start("iPhone", 100), stop("iPhone", 250)];
        assert_eq!(playback_duration(1, &events).unwrap(), 150);
    }

    #[test]
    fn test_disjoint_devices_sum_individually() {
        let events = [
            start("iPhone", 100),
            stop("iPhone", 200),
            start("Android", 300),
            stop("Android", 350),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 150);

        let sessions = reconstruct_sessions(1, &events, OrderingPolicy::Strict).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_overlapping_devices_merge_into_one_session() {
        // A: 100..300, B: 200..250 nested inside A
        let events = [
            start("A", 100),
            start("B", 200),
            stop("B", 250),
            stop("A", 300),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 200);

        let sessions = reconstruct_sessions(1, &events, OrderingPolicy::Strict).unwrap();
        assert_eq!(
            sessions,
            vec![UsageSession {
                start: 100,
                stop: 300,
                finished: true
            }]
        );
    }

    #[test]
    fn test_staggered_overlap_spans_first_start_to_last_stop() {
        let events = [
            start("A", 100),
            start("B", 150),
            stop("A", 200),
            stop("B", 260),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 160);
    }

    #[test]
    fn test_unterminated_session_contributes_zero() {
        let events = [
            start("A", 100),
            stop("A", 200),
            start("B", 300),
            start("C", 320),
            stop("C", 400),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 100);

        let sessions = reconstruct_sessions(1, &events, OrderingPolicy::Strict).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(
            sessions[1],
            UsageSession {
                start: 300,
                stop: 400,
                finished: false
            }
        );
    }

    #[test]
    fn test_only_starts_yield_zero() {
        let events = [start("A", 100), start("B", 120)];
        assert_eq!(playback_duration(1, &events).unwrap(), 0);
    }

    #[test]
    fn test_no_events_yield_zero() {
        let events: [TestEvent; 0] = [];
        assert_eq!(playback_duration(1, &events).unwrap(), 0);
        assert!(
            reconstruct_sessions(1, &events, OrderingPolicy::Strict)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_stop_without_start_fails() {
        let events = [stop("A", 100)];
        assert_eq!(
            playback_duration(1, &events).unwrap_err(),
            AnalyticsError::DeviceNotStarted {
                user_id: 1,
                device: "A".to_string(),
                date_actioned: 100,
            }
        );
    }

    #[test]
    fn test_double_stop_fails() {
        let events = [start("A", 100), stop("A", 200), stop("A", 300)];
        assert!(matches!(
            playback_duration(1, &events),
            Err(AnalyticsError::DeviceNotStarted { date_actioned: 300, .. })
        ));
    }

    #[test]
    fn test_stop_for_unknown_device_after_open_start_fails() {
        // The open session would contribute zero, but the bad stop still aborts
        let events = [start("A", 100), stop("B", 150)];
        assert!(matches!(
            playback_duration(1, &events),
            Err(AnalyticsError::DeviceNotStarted { .. })
        ));
    }

    #[test]
    fn test_invalid_action_aborts() {
        let events = [
            start("A", 100),
            TestEvent {
                user_id: 1,
                device: "A",
                action: "pause",
                at: 150,
            },
            stop("A", 200),
        ];
        assert_eq!(
            playback_duration(1, &events).unwrap_err(),
            AnalyticsError::InvalidAction {
                value: "pause".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_action_of_other_user_is_ignored() {
        let events = [
            start("A", 100),
            TestEvent {
                user_id: 2,
                device: "A",
                action: "pause",
                at: 150,
            },
            stop("A", 200),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 100);
    }

    #[test]
    fn test_other_users_do_not_interleave() {
        let events = [
            start("TV", 100),
            for_user(2, start("TV", 110)),
            stop("TV", 200),
            for_user(2, stop("TV", 500)),
        ];
        assert_eq!(playback_duration(1, &events).unwrap(), 100);
        assert_eq!(playback_duration(2, &events).unwrap(), 390);
        assert_eq!(playback_duration(3, &events).unwrap(), 0);
    }

    #[test]
    fn test_restarting_started_device_keeps_session_open_until_stop() {
        let events = [start("A", 100), start("A", 150), stop("A", 200)];
        assert_eq!(playback_duration(1, &events).unwrap(), 100);
    }

    #[test]
    fn test_strict_policy_rejects_out_of_order_events() {
        let events = [start("A", 300), stop("A", 400), start("B", 100), stop("B", 200)];
        assert_eq!(
            playback_duration(1, &events).unwrap_err(),
            AnalyticsError::EventsOutOfOrder {
                user_id: 1,
                previous: 400,
                current: 100,
            }
        );
    }

    #[test]
    fn test_sort_policy_reorders_events() {
        let events = [start("A", 300), stop("A", 400), start("B", 100), stop("B", 200)];
        assert_eq!(playback_duration_sorted(1, &events).unwrap(), 200);
    }

    #[test]
    fn test_sort_policy_keeps_input_order_for_ties() {
        // Stop and restart at the same instant closes one session and opens another
        let events = [start("A", 100), stop("A", 200), start("A", 200), stop("A", 260)];
        let sessions = reconstruct_sessions(1, &events, OrderingPolicy::Sort).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(finished_duration(1, &sessions).unwrap(), 160);
    }

    #[test]
    fn test_equal_timestamps_are_in_order() {
        let events = [start("A", 100), start("B", 100), stop("A", 100), stop("B", 100)];
        assert_eq!(playback_duration(1, &events).unwrap(), 0);
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let records = vec![
            EventRecord::new(1, "A", Action::Start, 10),
            EventRecord::new(1, "A", Action::Stop, 40),
        ];
        let before = records.clone();
        let first = playback_duration(1, &records).unwrap();
        let second = playback_duration(1, &records).unwrap();
        assert_eq!(first, 30);
        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn test_report_covers_every_user_independently() {
        let events = [
            start("A", 100),
            for_user(2, stop("TV", 110)),
            for_user(3, start("TV", 120)),
            stop("A", 200),
            for_user(3, stop("TV", 170)),
        ];

        let report = playback_report(&events, OrderingPolicy::Strict);
        assert_eq!(
            report,
            vec![
                UserPlayback {
                    user_id: 1,
                    result: Ok(100),
                },
                UserPlayback {
                    user_id: 2,
                    result: Err(AnalyticsError::DeviceNotStarted {
                        user_id: 2,
                        device: "TV".to_string(),
                        date_actioned: 110,
                    }),
                },
                UserPlayback {
                    user_id: 3,
                    result: Ok(50),
                },
            ]
        );
    }

    #[test]
    fn test_report_of_no_records_is_empty() {
        let events: [TestEvent; 0] = [];
        assert!(playback_report(&events, OrderingPolicy::Sort).is_empty());
    }

    #[test]
    fn test_session_wider_than_timestamp_range_overflows() {
        let events = [start("A", i64::MIN / 2 - 10), stop("A", i64::MAX / 2 + 10)];
        assert_eq!(
            playback_duration(1, &events).unwrap_err(),
            AnalyticsError::DurationOverflow { user_id: 1 }
        );
    }

    #[test]
    fn test_total_of_sessions_overflowing_fails() {
        let events = [
            start("A", -10),
            stop("A", i64::MAX - 10),
            start("A", i64::MAX - 5),
            stop("A", i64::MAX),
        ];
        assert_eq!(
            playback_duration(1, &events).unwrap_err(),
            AnalyticsError::DurationOverflow { user_id: 1 }
        );
    }

    #[test]
    fn test_large_timestamps_within_range_sum() {
        let events = [start("A", i64::MIN), stop("A", -1)];
        assert_eq!(playback_duration(1, &events).unwrap(), i64::MAX);
    }

    #[test]
    fn test_open_session_with_extreme_bounds_is_ignored() {
        // Open sessions are never measured, so they cannot overflow
        let events = [start("A", i64::MIN), start("B", i64::MAX)];
        assert_eq!(playback_duration(1, &events).unwrap(), 0);
    }
}
