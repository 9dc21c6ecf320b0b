//! User directory service

use crate::AppCore;
use crate::error::{CoreError, Result};
use crate::models::{User, UserId, UserProfile, UserSignals};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Resolve an external identity to its user, creating the user on first use.
pub async fn resolve_user(
    core: &Arc<AppCore>,
    external_identity: &str,
    mut profile: UserProfile,
) -> Result<User> {
    let identity = external_identity.trim();
    if identity.is_empty() {
        return Err(CoreError::validation("external identity is required"));
    }
    profile.display_name = profile.display_name.trim().to_string();
    if profile.display_name.is_empty() {
        profile.display_name = identity.to_string();
    }

    let (user, created) = core.storage.users.resolve(identity, profile)?;
    if created {
        info!(user_id = %user.id, "Created user for new identity");
    }
    Ok(user)
}

pub async fn get_user(core: &Arc<AppCore>, id: &UserId) -> Result<User> {
    core.storage.users.require(id)
}

/// Mark the user as active now.
pub async fn record_activity(core: &Arc<AppCore>, id: &UserId) -> Result<User> {
    core.storage.users.touch_activity(id, Utc::now())
}

pub async fn update_signals(
    core: &Arc<AppCore>,
    id: &UserId,
    signals: UserSignals,
) -> Result<User> {
    core.storage.users.update_signals(id, &signals)
}
