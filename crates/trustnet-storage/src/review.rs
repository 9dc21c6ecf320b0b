//! Review storage - reviews indexed by reviewer and by recommendation.

use crate::SimpleStorage;
use crate::range_utils::{composite_key, left_part_range};
use anyhow::Result;
use redb::{Database, ReadableDatabase, TableDefinition, WriteTransaction};
use std::sync::Arc;

const REVIEWS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("reviews");
/// Index: "{reviewer}:{review}" -> review id
const REVIEW_REVIEWER_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("review_reviewer_index");
/// Index: "{recommendation}:{review}" -> review id
const REVIEW_RECOMMENDATION_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("review_recommendation_index");

/// Low-level review storage
#[derive(Debug, Clone)]
pub struct ReviewStorage {
    db: Arc<Database>,
}

impl SimpleStorage for ReviewStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = REVIEWS_TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

impl ReviewStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(REVIEWS_TABLE)?;
        write_txn.open_table(REVIEW_REVIEWER_INDEX_TABLE)?;
        write_txn.open_table(REVIEW_RECOMMENDATION_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn put_raw(&self, id: &str, reviewer: &str, recommendation: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::put_in(&write_txn, id, reviewer, recommendation, data)?;
        write_txn.commit()?;
        Ok(())
    }

    pub fn list_by_reviewer_raw(&self, reviewer: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_via_index(REVIEW_REVIEWER_INDEX_TABLE, reviewer)
    }

    pub fn list_by_recommendation_raw(&self, recommendation: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_via_index(REVIEW_RECOMMENDATION_INDEX_TABLE, recommendation)
    }

    fn list_via_index(
        &self,
        index_def: TableDefinition<'static, &'static str, &'static str>,
        left: &str,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(index_def)?;
        let table = read_txn.open_table(REVIEWS_TABLE)?;
        let (start, end) = left_part_range(left);

        let mut reviews = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, id) = item?;
            if let Some(data) = table.get(id.value())? {
                reviews.push((id.value().to_string(), data.value().to_vec()));
            }
        }
        Ok(reviews)
    }

    // ============== Transaction-scoped Operations ==============

    pub fn put_in(
        txn: &WriteTransaction,
        id: &str,
        reviewer: &str,
        recommendation: &str,
        data: &[u8],
    ) -> Result<()> {
        let mut table = txn.open_table(REVIEWS_TABLE)?;
        table.insert(id, data)?;

        let mut by_reviewer = txn.open_table(REVIEW_REVIEWER_INDEX_TABLE)?;
        let reviewer_key = composite_key(reviewer, id);
        by_reviewer.insert(reviewer_key.as_str(), id)?;

        let mut by_recommendation = txn.open_table(REVIEW_RECOMMENDATION_INDEX_TABLE)?;
        let recommendation_key = composite_key(recommendation, id);
        by_recommendation.insert(recommendation_key.as_str(), id)?;
        Ok(())
    }
}
