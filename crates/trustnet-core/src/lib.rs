//! TrustNet core: the trust-graph visibility and recommender-matching engine.
//!
//! - [`graph`]: first/second-degree neighborhoods over accepted connections
//! - [`visibility`]: which recommendations a viewer may see
//! - [`scoring`]: ranks a user's network as recommenders for a query
//! - [`storage`]: typed redb storage, including clique formation and the ask
//!   lifecycle transactions
//! - [`services`]: the operations exposed to the server

pub mod error;
pub mod graph;
pub mod models;
pub mod paths;
pub mod scoring;
pub mod services;
pub mod storage;
pub mod visibility;

pub use error::{CoreError, ErrorKind};
pub use models::*;

use scoring::ScoringConfig;
use std::sync::Arc;
use storage::Storage;
use tracing::info;

/// Core application state shared by every request handler.
pub struct AppCore {
    pub storage: Arc<Storage>,
    pub scoring: ScoringConfig,
}

impl AppCore {
    pub async fn new(db_path: &str) -> anyhow::Result<Self> {
        Self::with_scoring(db_path, ScoringConfig::default()).await
    }

    pub async fn with_scoring(db_path: &str, scoring: ScoringConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(db_path)?);

        info!(
            db_path,
            suggestion_limit = scoring.suggestion_limit,
            "Initializing TrustNet core"
        );

        Ok(Self { storage, scoring })
    }
}
