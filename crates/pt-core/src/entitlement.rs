//! Joining user feature entitlements with per-app feature catalogs.

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::record::UserId;

/// Identifier of an application.
pub type AppId = i64;

/// Identifier of a feature.
pub type FeatureId = i64;

/// A user has access to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApp {
    pub user_id: UserId,
    pub app_id: AppId,
}

/// The features an application offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFeatures {
    pub app_id: AppId,
    pub features_available: Vec<FeatureId>,
}

/// The features a user is permitted to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFeatures {
    pub user_id: UserId,
    pub features_allowed: Vec<FeatureId>,
}

/// Features a user may use within one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermission {
    pub app_id: AppId,
    pub features_allowed: Vec<FeatureId>,
}

/// Per-application permissions of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    pub user_id: UserId,
    pub application_permissions: Vec<AppPermission>,
}

/// Computes which features `user_id` may use in each of their applications.
///
/// Applications without a catalog entry are skipped. Within an application,
/// allowed features keep the catalog's order. The first matching entitlement
/// and catalog record is used when duplicates exist.
pub fn permissions_for_user(
    user_id: UserId,
    user_apps: &[UserApp],
    app_features: &[AppFeatures],
    user_features: &[UserFeatures],
) -> Result<UserPermissions, AnalyticsError> {
    let allowed = &user_features
        .iter()
        .find(|uf| uf.user_id == user_id)
        .ok_or(AnalyticsError::UserNotFound { user_id })?
        .features_allowed;

    let application_permissions: Vec<AppPermission> = user_apps
        .iter()
        .filter(|ua| ua.user_id == user_id)
        .filter_map(|ua| {
            let Some(catalog) = app_features.iter().find(|af| af.app_id == ua.app_id) else {
                tracing::debug!(user_id, app_id = ua.app_id, "no feature catalog for app");
                return None;
            };
            Some(AppPermission {
                app_id: catalog.app_id,
                features_allowed: catalog
                    .features_available
                    .iter()
                    .copied()
                    .filter(|f| allowed.contains(f))
                    .collect(),
            })
        })
        .collect();

    Ok(UserPermissions {
        user_id,
        application_permissions,
    })
}
