//! Core analytics for the playback tracker.
//!
//! This crate contains the pure computations over a materialized snapshot:
//! - Action filtering: which users performed an action at a given time
//! - Playback reconstruction: merging per-device activity into sessions
//! - Entitlements: joining user features with per-app feature catalogs

pub mod action;
pub mod entitlement;
mod error;
pub mod filter;
pub mod playback;
pub mod record;

pub use action::Action;
pub use entitlement::{
    AppFeatures, AppId, AppPermission, FeatureId, UserApp, UserFeatures, UserPermissions,
    permissions_for_user,
};
pub use error::AnalyticsError;
pub use filter::{select_users, users_matching};
pub use playback::{
    OrderingPolicy, UsageSession, UserPlayback, finished_duration, playback_duration,
    playback_duration_sorted, playback_duration_with, playback_report, reconstruct_sessions,
};
pub use record::{ActionEvent, EventRecord, Timestamp, UserId};
