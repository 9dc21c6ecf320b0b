use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Accepted,
}

/// A directed, status-tagged edge. Traversal treats it as undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: UserId,
    pub to: UserId,
    pub status: ConnectionStatus,
    pub connected_at: DateTime<Utc>,
}

impl Connection {
    pub fn accepted(from: UserId, to: UserId, connected_at: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            status: ConnectionStatus::Accepted,
            connected_at,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ConnectionStatus::Accepted
    }
}

/// Degree of separation between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Degree {
    First,
    Second,
}

impl Degree {
    pub fn as_number(self) -> u8 {
        match self {
            Degree::First => 1,
            Degree::Second => 2,
        }
    }
}
