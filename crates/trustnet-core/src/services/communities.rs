//! Community membership service

use crate::AppCore;
use crate::error::{CoreError, Result};
use crate::models::{Community, CommunityId, CommunityMembership, UserId};
use crate::storage::ApprovalOutcome;
use std::sync::Arc;
use tracing::info;

const MAX_NAME_LEN: usize = 120;

pub async fn create_community(
    core: &Arc<AppCore>,
    owner: &UserId,
    name: &str,
) -> Result<Community> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("community name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::validation(format!(
            "community name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    core.storage.users.require(owner)?;

    let community = core.storage.communities.create(owner, name.to_string())?;
    info!(community_id = %community.id, %owner, "Created community");
    Ok(community)
}

pub async fn get_community(core: &Arc<AppCore>, id: &CommunityId) -> Result<Community> {
    core.storage.communities.require(id)
}

pub async fn request_join(
    core: &Arc<AppCore>,
    community: &CommunityId,
    user: &UserId,
) -> Result<CommunityMembership> {
    core.storage.users.require(user)?;
    let membership = core.storage.communities.request_join(community, user)?;
    info!(%community, %user, "Join requested");
    Ok(membership)
}

/// Approve a pending request; the new member is connected to every other
/// approved member.
pub async fn approve_member(
    core: &Arc<AppCore>,
    community: &CommunityId,
    target: &UserId,
    approver: &UserId,
) -> Result<ApprovalOutcome> {
    core.storage.users.require(target)?;
    let outcome = core.storage.communities.approve(community, target, approver)?;
    info!(
        %community,
        user = %target,
        new_connections = outcome.new_connections.len(),
        "Approved community member"
    );
    Ok(outcome)
}

pub async fn list_members(
    core: &Arc<AppCore>,
    community: &CommunityId,
) -> Result<Vec<CommunityMembership>> {
    core.storage.communities.require(community)?;
    core.storage.communities.list_members(community)
}

/// Pending join requests, visible to the owner only.
pub async fn list_pending(
    core: &Arc<AppCore>,
    community: &CommunityId,
    actor: &UserId,
) -> Result<Vec<CommunityMembership>> {
    let found = core.storage.communities.require(community)?;
    if &found.created_by != actor {
        return Err(CoreError::NotAuthorized);
    }
    core.storage.communities.list_pending(community)
}
