use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user record as exposed by the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub external_identity: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Non-negative; feeds the trust signal of the recommender score.
    #[serde(default)]
    pub trust_score: f64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Fraction of asks answered, 0.0..=1.0.
    #[serde(default)]
    pub response_rate: Option<f64>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_profile_image(&self) -> bool {
        self.profile_image
            .as_deref()
            .is_some_and(|image| !image.trim().is_empty())
    }
}

/// Profile fields supplied when an external identity is first resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Activity-derived signals that may be updated after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignals {
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub response_rate: Option<f64>,
}
