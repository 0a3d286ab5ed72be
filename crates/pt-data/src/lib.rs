//! Data sources for the playback tracker.
//!
//! A data source hands out a read-only [`Snapshot`] of the four relations the
//! analytics work on. Nothing is written back.
//!
//! # Snapshot Format
//!
//! Snapshots are JSON objects with four arrays:
//!
//! ```json
//! {
//!   "actions": [{"user_id": 1, "device": "iPhone", "action": "start", "date_actioned": 100}],
//!   "user_apps": [{"user_id": 1, "app_id": 1}],
//!   "app_features": [{"app_id": 1, "features_available": [1, 2, 3]}],
//!   "user_features": [{"user_id": 1, "features_allowed": [1, 2]}]
//! }
//! ```
//!
//! Missing arrays are treated as empty. `actions` must list each user's events
//! in chronological order unless the consumer sorts them.

use std::path::{Path, PathBuf};

use pt_core::{AppFeatures, EventRecord, UserApp, UserFeatures};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample snapshot shipped with the crate.
const SAMPLE_SNAPSHOT: &str = include_str!("../fixtures/sample.json");

/// Data source errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// The snapshot file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot is not valid JSON of the expected shape.
    #[error("invalid snapshot in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The four relations read from a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub actions: Vec<EventRecord>,
    #[serde(default)]
    pub user_apps: Vec<UserApp>,
    #[serde(default)]
    pub app_features: Vec<AppFeatures>,
    #[serde(default)]
    pub user_features: Vec<UserFeatures>,
}

impl Snapshot {
    /// Parses a snapshot from JSON text; `origin` names the text in errors.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, DataError> {
        let snapshot: Self = serde_json::from_str(json).map_err(|source| DataError::Json {
            origin: origin.to_string(),
            source,
        })?;
        tracing::debug!(
            origin,
            actions = snapshot.actions.len(),
            user_apps = snapshot.user_apps.len(),
            app_features = snapshot.app_features.len(),
            user_features = snapshot.user_features.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }
}

/// A read-only provider of snapshots.
pub trait DataSource {
    /// Reads the current snapshot.
    fn data(&self) -> Result<Snapshot, DataError>;
}

/// The built-in sample snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSource;

impl DataSource for FixtureSource {
    fn data(&self) -> Result<Snapshot, DataError> {
        Snapshot::from_json(SAMPLE_SNAPSHOT, "built-in sample")
    }
}

/// A snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for JsonFileSource {
    fn data(&self) -> Result<Snapshot, DataError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| DataError::Io {
            path: self.path.clone(),
            source,
        })?;
        Snapshot::from_json(&json, &self.path.display().to_string())
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn data(&self) -> Result<Snapshot, DataError> {
        (**self).data()
    }
}
