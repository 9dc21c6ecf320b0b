//! Recommendation service: creation, owner edits, sharing and visibility-
//! filtered reads.

use crate::AppCore;
use crate::error::{CoreError, Result};
use crate::models::{
    CommunityId, ProviderDetails, Recommendation, RecommendationId, Review, UserId, Visibility,
    normalize_tags,
};
use crate::visibility::{LiveRelations, ViewerScope, filter_visible, is_visible};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecommendation {
    pub owner: UserId,
    pub provider: ProviderDetails,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub communities: Vec<CommunityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationUpdate {
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

pub async fn create_recommendation(
    core: &Arc<AppCore>,
    input: NewRecommendation,
) -> Result<Recommendation> {
    core.storage.users.require(&input.owner)?;
    let provider = validate_provider(input.provider)?;
    let tags = normalize_tags(&input.tags)?;
    let communities: BTreeSet<CommunityId> = input.communities.into_iter().collect();
    for community in &communities {
        ensure_can_share(core, &input.owner, community)?;
    }

    let mut recommendation = Recommendation::new(input.owner, provider, tags, input.visibility);
    recommendation.communities = communities;
    let recommendation = core.storage.recommendations.create(recommendation)?;

    info!(
        recommendation_id = %recommendation.id,
        owner = %recommendation.owner,
        visibility = ?recommendation.visibility,
        "Created recommendation"
    );
    Ok(recommendation)
}

/// Change visibility and/or tags. Only the owner may do this.
pub async fn update_recommendation(
    core: &Arc<AppCore>,
    id: &RecommendationId,
    actor: &UserId,
    update: RecommendationUpdate,
) -> Result<Recommendation> {
    let mut recommendation = core.storage.recommendations.require(id)?;
    if &recommendation.owner != actor {
        return Err(CoreError::forbidden("only the owner can edit a recommendation"));
    }

    if let Some(visibility) = update.visibility {
        recommendation.visibility = visibility;
    }
    if let Some(tags) = update.tags {
        recommendation.tags = normalize_tags(&tags)?;
    }
    recommendation.updated_at = Utc::now();
    core.storage.recommendations.update(&recommendation)?;

    info!(recommendation_id = %id, "Updated recommendation");
    Ok(recommendation)
}

/// Share a recommendation into one of the owner's communities. Idempotent.
pub async fn share_recommendation(
    core: &Arc<AppCore>,
    id: &RecommendationId,
    actor: &UserId,
    community: &CommunityId,
) -> Result<Recommendation> {
    let recommendation = core.storage.recommendations.require(id)?;
    if &recommendation.owner != actor {
        return Err(CoreError::forbidden("only the owner can share a recommendation"));
    }
    ensure_can_share(core, actor, community)?;

    if core.storage.recommendations.share(id, community)? {
        info!(recommendation_id = %id, %community, "Shared recommendation");
    }
    core.storage.recommendations.require(id)
}

/// Fetch a recommendation for a viewer. Invisible records are reported as
/// missing.
pub async fn get_recommendation(
    core: &Arc<AppCore>,
    id: &RecommendationId,
    viewer: &UserId,
) -> Result<Recommendation> {
    let not_found = || CoreError::not_found(format!("recommendation {id}"));
    let recommendation = core.storage.recommendations.get(id)?.ok_or_else(not_found)?;

    let relations = LiveRelations::new(
        viewer,
        &core.storage.connections,
        &core.storage.communities,
    );
    if is_visible(&recommendation, &relations)? {
        Ok(recommendation)
    } else {
        Err(not_found())
    }
}

/// Every recommendation the viewer may see, newest first.
pub async fn list_visible(core: &Arc<AppCore>, viewer: &UserId) -> Result<Vec<Recommendation>> {
    let scope = ViewerScope::load(viewer, &core.storage.connections, &core.storage.communities)?;
    let mut visible = filter_visible(core.storage.recommendations.list_all()?, &scope)?;
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(visible)
}

/// Reviews attached to a recommendation the viewer can see.
pub async fn list_reviews(
    core: &Arc<AppCore>,
    id: &RecommendationId,
    viewer: &UserId,
) -> Result<Vec<Review>> {
    get_recommendation(core, id, viewer).await?;
    core.storage.recommendations.reviews_for(id)
}

fn validate_provider(mut provider: ProviderDetails) -> Result<ProviderDetails> {
    provider.name = provider.name.trim().to_string();
    if provider.name.is_empty() {
        return Err(CoreError::validation("provider name is required"));
    }
    provider.email = provider.normalized_email();
    Ok(provider)
}

fn ensure_can_share(core: &Arc<AppCore>, owner: &UserId, community: &CommunityId) -> Result<()> {
    core.storage.communities.require(community)?;
    if !core.storage.communities.is_approved_member(community, owner)? {
        return Err(CoreError::forbidden(format!(
            "not an approved member of community {community}"
        )));
    }
    Ok(())
}
