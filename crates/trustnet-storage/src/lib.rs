//! TrustNet Storage - Low-level storage abstraction layer
//!
//! This crate provides the persistence layer for TrustNet, using redb as the
//! embedded database. It exposes byte-level APIs so it does not depend on the
//! domain models, which live in trustnet-core.
//!
//! # Tables
//!
//! - `users` (+ `user_identity_index`) - user directory
//! - `connections` (+ `connection_reverse_index`) - directed accepted edges
//! - `communities` - trust circles
//! - `memberships` (+ `membership_user_index`) - per (community, user) status
//! - `recommendations` (+ owner/email indexes, share relation) - provider records
//! - `reviews` (+ reviewer/recommendation indexes)
//! - `asks` (+ asker/recipient indexes), `ask_responses` (+ per-ask index)
//!
//! # Transactions
//!
//! Single-entity writes open and commit their own transaction. Operations
//! spanning several tables go through [`Storage::atomic`] and the `*_in`
//! functions, which all run inside one caller-owned write transaction.

pub mod ask;
pub mod community;
pub mod connection;
pub mod membership;
pub mod range_utils;
pub mod recommendation;
pub mod review;
pub mod simple_storage;
pub mod user;

use anyhow::Result;
use redb::{Database, WriteTransaction};
use std::sync::Arc;

pub use ask::AskStorage;
pub use community::CommunityStorage;
pub use connection::ConnectionStorage;
pub use membership::MembershipStorage;
pub use recommendation::RecommendationStorage;
pub use review::ReviewStorage;
pub use simple_storage::SimpleStorage;
pub use user::UserStorage;

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    db: Arc<Database>,
    pub users: UserStorage,
    pub connections: ConnectionStorage,
    pub communities: CommunityStorage,
    pub memberships: MembershipStorage,
    pub recommendations: RecommendationStorage,
    pub reviews: ReviewStorage,
    pub asks: AskStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let users = UserStorage::new(db.clone())?;
        let connections = ConnectionStorage::new(db.clone())?;
        let communities = CommunityStorage::new(db.clone())?;
        let memberships = MembershipStorage::new(db.clone())?;
        let recommendations = RecommendationStorage::new(db.clone())?;
        let reviews = ReviewStorage::new(db.clone())?;
        let asks = AskStorage::new(db.clone())?;

        Ok(Self {
            db,
            users,
            connections,
            communities,
            memberships,
            recommendations,
            reviews,
            asks,
        })
    }

    /// Run `f` inside one write transaction.
    ///
    /// The transaction commits only when `f` returns `Ok`; on `Err` it is
    /// aborted and none of its writes become visible.
    pub fn atomic<T, E>(
        &self,
        f: impl FnOnce(&WriteTransaction) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let txn = self.db.begin_write().map_err(anyhow::Error::from)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(anyhow::Error::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!(error = %abort_err, "Failed to abort write transaction");
                }
                Err(err)
            }
        }
    }
}
