//! Typed recommendation storage: records, the community share relation and
//! reviews.

use super::{decode, encode};
use crate::error::{CoreError, Result};
use crate::models::{
    AskId, CommunityId, ProviderDetails, Recommendation, RecommendationId, Review, ReviewDetails,
    UserId, Visibility,
};
use crate::scoring::ReviewLookup;
use chrono::Utc;
use redb::WriteTransaction;
use std::collections::BTreeSet;
use std::sync::Arc;
use trustnet_storage::SimpleStorage;

type RawRecommendations = trustnet_storage::RecommendationStorage;
type RawReviews = trustnet_storage::ReviewStorage;

#[derive(Clone)]
pub struct RecommendationStorage {
    raw: Arc<trustnet_storage::Storage>,
}

impl RecommendationStorage {
    pub fn new(raw: Arc<trustnet_storage::Storage>) -> Self {
        Self { raw }
    }

    /// Store a new recommendation and share it into `communities`.
    pub fn create(&self, mut recommendation: Recommendation) -> Result<Recommendation> {
        let communities = std::mem::take(&mut recommendation.communities);
        let email = recommendation.provider.normalized_email();

        self.raw.atomic(|txn| {
            RawRecommendations::put_in(
                txn,
                recommendation.id.as_str(),
                recommendation.owner.as_str(),
                email.as_deref(),
                &encode(&recommendation)?,
            )?;
            for community in &communities {
                RawRecommendations::share_in(txn, recommendation.id.as_str(), community.as_str())?;
            }
            Ok::<_, CoreError>(())
        })?;

        recommendation.communities = communities;
        Ok(recommendation)
    }

    pub fn get(&self, id: &RecommendationId) -> Result<Option<Recommendation>> {
        match self.raw.recommendations.get_raw(id.as_str())? {
            Some(bytes) => Ok(Some(self.hydrate(decode(&bytes)?)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: &RecommendationId) -> Result<Recommendation> {
        self.get(id)?
            .ok_or_else(|| CoreError::not_found(format!("recommendation {id}")))
    }

    /// Persist changed fields of an existing recommendation.
    pub fn update(&self, recommendation: &Recommendation) -> Result<()> {
        let mut stored = recommendation.clone();
        stored.communities.clear();
        self.raw
            .recommendations
            .update_raw(stored.id.as_str(), &encode(&stored)?)?;
        Ok(())
    }

    /// Share into a community. Returns `false` if it was already shared there.
    pub fn share(&self, id: &RecommendationId, community: &CommunityId) -> Result<bool> {
        Ok(self
            .raw
            .recommendations
            .share(id.as_str(), community.as_str())?)
    }

    pub fn list_all(&self) -> Result<Vec<Recommendation>> {
        self.raw
            .recommendations
            .list_raw()?
            .iter()
            .map(|(_, bytes)| self.hydrate(decode(bytes)?))
            .collect()
    }

    pub fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Recommendation>> {
        self.raw
            .recommendations
            .list_by_owner_raw(owner.as_str())?
            .iter()
            .map(|(_, bytes)| self.hydrate(decode(bytes)?))
            .collect()
    }

    pub fn find_by_provider_email(&self, email: &str) -> Result<Option<Recommendation>> {
        match self
            .raw
            .recommendations
            .find_by_provider_email(&email.trim().to_lowercase())?
        {
            Some(id) => self.get(&RecommendationId::from(id)),
            None => Ok(None),
        }
    }

    // ============== Reviews ==============

    pub fn add_review(&self, review: &Review) -> Result<()> {
        self.raw.reviews.put_raw(
            review.id.as_str(),
            review.reviewer.as_str(),
            review.recommendation_id.as_str(),
            &encode(review)?,
        )?;
        Ok(())
    }

    pub fn reviews_by(&self, reviewer: &UserId) -> Result<Vec<Review>> {
        self.raw
            .reviews
            .list_by_reviewer_raw(reviewer.as_str())?
            .iter()
            .map(|(_, bytes)| decode(bytes))
            .collect()
    }

    pub fn reviews_for(&self, recommendation: &RecommendationId) -> Result<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .raw
            .reviews
            .list_by_recommendation_raw(recommendation.as_str())?
            .iter()
            .map(|(_, bytes)| decode(bytes))
            .collect::<Result<_>>()?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    fn hydrate(&self, mut recommendation: Recommendation) -> Result<Recommendation> {
        recommendation.communities = self
            .raw
            .recommendations
            .list_shares(recommendation.id.as_str())?
            .into_iter()
            .map(CommunityId::from)
            .collect();
        Ok(recommendation)
    }

    // ============== Transaction-scoped Operations ==============

    /// Reuse the recommendation matching the provider's email, or create one
    /// owned by `owner` tagged with `tags`. A reused record gains `tags`.
    pub fn find_or_create_in(
        txn: &WriteTransaction,
        owner: &UserId,
        provider: ProviderDetails,
        tags: BTreeSet<String>,
    ) -> Result<RecommendationId> {
        let email = provider.normalized_email();
        if let Some(email) = email.as_deref()
            && let Some(id) = RawRecommendations::find_by_provider_email_in(txn, email)?
            && let Some(bytes) = RawRecommendations::get_raw_in(txn, &id)?
        {
            let mut existing: Recommendation = decode(&bytes)?;
            if !tags.is_subset(&existing.tags) {
                existing.tags.extend(tags);
                existing.updated_at = Utc::now();
                RawRecommendations::put_raw_in(txn, &id, &encode(&existing)?)?;
            }
            return Ok(existing.id);
        }

        let recommendation =
            Recommendation::new(owner.clone(), provider, tags, Visibility::Connections);
        RawRecommendations::put_in(
            txn,
            recommendation.id.as_str(),
            owner.as_str(),
            email.as_deref(),
            &encode(&recommendation)?,
        )?;
        Ok(recommendation.id)
    }

    pub fn add_review_in(
        txn: &WriteTransaction,
        recommendation: &RecommendationId,
        reviewer: &UserId,
        details: ReviewDetails,
        ask_id: Option<AskId>,
    ) -> Result<Review> {
        let review = Review::new(recommendation.clone(), reviewer.clone(), details, ask_id);
        RawReviews::put_in(
            txn,
            review.id.as_str(),
            reviewer.as_str(),
            recommendation.as_str(),
            &encode(&review)?,
        )?;
        Ok(review)
    }
}

impl ReviewLookup for RecommendationStorage {
    fn has_reviewed_tag(&self, reviewer: &UserId, tag: &str) -> Result<bool> {
        for review in self.reviews_by(reviewer)? {
            if let Some(bytes) = self
                .raw
                .recommendations
                .get_raw(review.recommendation_id.as_str())?
                && decode::<Recommendation>(&bytes)?.has_tag(tag)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
