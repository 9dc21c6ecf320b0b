use super::ids::{AskId, CommunityId, RecommendationId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Publication scope of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Connections,
    Communities,
    Public,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetails {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProviderDetails {
    /// Lowercased, trimmed email used to match an existing recommendation.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: RecommendationId,
    pub owner: UserId,
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub provider: ProviderDetails,
    /// Communities this recommendation is shared into.
    ///
    /// The share relation lives in its own table; this field is filled on
    /// load and cleared before the record is persisted.
    #[serde(default)]
    pub communities: BTreeSet<CommunityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(
        owner: UserId,
        provider: ProviderDetails,
        tags: BTreeSet<String>,
        visibility: Visibility,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecommendationId::generate(),
            owner,
            visibility,
            tags,
            provider,
            communities: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    /// 1..=5 when present.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub recommendation_id: RecommendationId,
    pub reviewer: UserId,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ask_id: Option<AskId>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        recommendation_id: RecommendationId,
        reviewer: UserId,
        details: ReviewDetails,
        ask_id: Option<AskId>,
    ) -> Self {
        Self {
            id: ReviewId::generate(),
            recommendation_id,
            reviewer,
            rating: details.rating,
            text: details.text,
            ask_id,
            created_at: Utc::now(),
        }
    }
}
