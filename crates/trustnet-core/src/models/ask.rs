use super::ids::{AskId, AskResponseId, RecommendationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AskStatus {
    #[default]
    Pending,
    Fulfilled,
}

/// A request for a recommendation sent to a fixed set of recipients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ask {
    pub id: AskId,
    pub asker: UserId,
    pub recipients: BTreeSet<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub status: AskStatus,
    #[serde(default)]
    pub declined_by: BTreeSet<UserId>,
    #[serde(default)]
    pub recommendation_id: Option<RecommendationId>,
    #[serde(default)]
    pub fulfilled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ask {
    pub fn new(
        asker: UserId,
        recipients: BTreeSet<UserId>,
        title: String,
        description: String,
        query: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AskId::generate(),
            asker,
            recipients,
            title,
            description,
            query,
            status: AskStatus::Pending,
            declined_by: BTreeSet::new(),
            recommendation_id: None,
            fulfilled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_recipient(&self, user: &UserId) -> bool {
        self.recipients.contains(user)
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.asker == user || self.is_recipient(user)
    }

    pub fn has_declined(&self, user: &UserId) -> bool {
        self.declined_by.contains(user)
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == AskStatus::Fulfilled
    }

    /// Record a decline. Returns `false` when the user had already declined.
    pub fn decline(&mut self, user: UserId) -> bool {
        let inserted = self.declined_by.insert(user);
        if inserted {
            self.updated_at = Utc::now();
        }
        inserted
    }

    pub fn mark_fulfilled(&mut self, recommendation_id: RecommendationId, by: UserId) {
        self.status = AskStatus::Fulfilled;
        self.recommendation_id = Some(recommendation_id);
        self.fulfilled_by = Some(by);
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub id: AskResponseId,
    pub ask_id: AskId,
    pub responder: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl AskResponse {
    pub fn new(ask_id: AskId, responder: UserId, text: String) -> Self {
        Self {
            id: AskResponseId::generate(),
            ask_id,
            responder,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Status of an ask as seen by one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveAskStatus {
    Pending,
    Fulfilled,
    Responded,
}

/// Recipient-side view of an ask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundAsk {
    pub id: AskId,
    pub asker: UserId,
    pub title: String,
    pub description: String,
    pub query: Option<String>,
    pub status: EffectiveAskStatus,
    pub recommendation_id: Option<RecommendationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InboundAsk {
    pub fn from_ask(ask: Ask, responded: bool) -> Self {
        let status = if responded {
            EffectiveAskStatus::Responded
        } else {
            match ask.status {
                AskStatus::Pending => EffectiveAskStatus::Pending,
                AskStatus::Fulfilled => EffectiveAskStatus::Fulfilled,
            }
        };
        Self {
            id: ask.id,
            asker: ask.asker,
            title: ask.title,
            description: ask.description,
            query: ask.query,
            status,
            recommendation_id: ask.recommendation_id,
            created_at: ask.created_at,
            updated_at: ask.updated_at,
        }
    }
}
