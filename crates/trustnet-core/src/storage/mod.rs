//! Storage layer with typed wrappers around trustnet-storage.
//!
//! The wrappers convert between domain models and the byte-level tables and
//! enforce the invariants that must hold inside a single write transaction
//! (clique formation, declines, fulfillment).

pub mod asks;
pub mod communities;
pub mod connections;
pub mod recommendations;
pub mod users;

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use asks::AskStorage;
pub use communities::{ApprovalOutcome, CommunityStorage};
pub use connections::ConnectionStorage;
pub use recommendations::RecommendationStorage;
pub use users::UserStorage;

/// Central storage manager exposing the typed wrappers.
pub struct Storage {
    raw: Arc<trustnet_storage::Storage>,
    pub users: UserStorage,
    pub connections: ConnectionStorage,
    pub communities: CommunityStorage,
    pub recommendations: RecommendationStorage,
    pub asks: AskStorage,
}

impl Storage {
    /// Open (or create) the database at `path` and initialize every table.
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let raw = Arc::new(trustnet_storage::Storage::new(path)?);

        Ok(Self {
            users: UserStorage::new(raw.clone()),
            connections: ConnectionStorage::new(raw.clone()),
            communities: CommunityStorage::new(raw.clone()),
            recommendations: RecommendationStorage::new(raw.clone()),
            asks: AskStorage::new(raw.clone()),
            raw,
        })
    }

    /// Get a reference to the underlying byte-level storage
    pub fn raw(&self) -> Arc<trustnet_storage::Storage> {
        self.raw.clone()
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Storage;
    use crate::models::{User, UserId, UserProfile};
    use tempfile::TempDir;

    pub fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = Storage::new(db_path.to_str().unwrap()).unwrap();
        (storage, temp_dir)
    }

    pub fn create_user(storage: &Storage, identity: &str) -> UserId {
        let profile = UserProfile {
            display_name: identity.to_string(),
            ..Default::default()
        };
        let (user, _): (User, bool) = storage.users.resolve(identity, profile).unwrap();
        user.id
    }
}
