use super::ids::{CommunityId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trust circle with exactly one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Requested,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMembership {
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub status: MembershipStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl CommunityMembership {
    pub fn requested(user_id: UserId, community_id: CommunityId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            community_id,
            status: MembershipStatus::Requested,
            requested_at: at,
            approved_at: None,
        }
    }

    /// Owner rows are approved the moment they are requested.
    pub fn owner(user_id: UserId, community_id: CommunityId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            community_id,
            status: MembershipStatus::Approved,
            requested_at: at,
            approved_at: Some(at),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == MembershipStatus::Approved
    }
}
