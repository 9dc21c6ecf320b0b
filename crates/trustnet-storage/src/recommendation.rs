//! Recommendation storage - service-provider records, the owner and
//! provider-email indexes, and the community share relation.

use crate::SimpleStorage;
use crate::range_utils::{composite_key, left_part_range, split_key};
use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

const RECOMMENDATIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("recommendations");
/// Index: "{owner}:{recommendation}" -> recommendation id
const RECOMMENDATION_OWNER_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("recommendation_owner_index");
/// Index: lowercase provider email -> recommendation id
const RECOMMENDATION_EMAIL_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("recommendation_email_index");
/// Share relation: "{community}:{recommendation}" -> recommendation id
const RECOMMENDATION_SHARES_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("recommendation_shares");
/// Reverse share relation: "{recommendation}:{community}" -> community id
const RECOMMENDATION_SHARES_REVERSE_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("recommendation_shares_reverse");

/// Low-level recommendation storage
#[derive(Debug, Clone)]
pub struct RecommendationStorage {
    db: Arc<Database>,
}

impl SimpleStorage for RecommendationStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = RECOMMENDATIONS_TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

impl RecommendationStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(RECOMMENDATIONS_TABLE)?;
        write_txn.open_table(RECOMMENDATION_OWNER_INDEX_TABLE)?;
        write_txn.open_table(RECOMMENDATION_EMAIL_INDEX_TABLE)?;
        write_txn.open_table(RECOMMENDATION_SHARES_TABLE)?;
        write_txn.open_table(RECOMMENDATION_SHARES_REVERSE_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store a recommendation together with its owner and email index entries.
    pub fn put_raw(
        &self,
        id: &str,
        owner: &str,
        provider_email: Option<&str>,
        data: &[u8],
    ) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::put_in(&write_txn, id, owner, provider_email, data)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite the stored bytes of an existing recommendation.
    pub fn update_raw(&self, id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        <Self as SimpleStorage>::put_raw_in(&write_txn, id, data)?;
        write_txn.commit()?;
        Ok(())
    }

    pub fn find_by_provider_email(&self, email: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RECOMMENDATION_EMAIL_INDEX_TABLE)?;
        Ok(index.get(email)?.map(|value| value.value().to_string()))
    }

    pub fn list_by_owner_raw(&self, owner: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RECOMMENDATION_OWNER_INDEX_TABLE)?;
        let table = read_txn.open_table(RECOMMENDATIONS_TABLE)?;
        let (start, end) = left_part_range(owner);

        let mut items = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, id) = item?;
            if let Some(data) = table.get(id.value())? {
                items.push((id.value().to_string(), data.value().to_vec()));
            }
        }
        Ok(items)
    }

    /// Share a recommendation into a community. Returns `false` if already shared.
    pub fn share(&self, id: &str, community: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let inserted = Self::share_in(&write_txn, id, community)?;
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Community ids a recommendation is shared into.
    pub fn list_shares(&self, id: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let reverse = read_txn.open_table(RECOMMENDATION_SHARES_REVERSE_TABLE)?;
        let (start, end) = left_part_range(id);

        let mut communities = Vec::new();
        for item in reverse.range(start.as_str()..end.as_str())? {
            let (_, community) = item?;
            communities.push(community.value().to_string());
        }
        Ok(communities)
    }

    /// Recommendation ids shared into a community.
    pub fn list_shared_into(&self, community: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let shares = read_txn.open_table(RECOMMENDATION_SHARES_TABLE)?;
        let (start, end) = left_part_range(community);

        let mut ids = Vec::new();
        for item in shares.range(start.as_str()..end.as_str())? {
            let (key, _) = item?;
            if let Some((_, id)) = split_key(key.value()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    // ============== Transaction-scoped Operations ==============

    pub fn put_in(
        txn: &WriteTransaction,
        id: &str,
        owner: &str,
        provider_email: Option<&str>,
        data: &[u8],
    ) -> Result<()> {
        let mut table = txn.open_table(RECOMMENDATIONS_TABLE)?;
        table.insert(id, data)?;

        let mut owner_index = txn.open_table(RECOMMENDATION_OWNER_INDEX_TABLE)?;
        let owner_key = composite_key(owner, id);
        owner_index.insert(owner_key.as_str(), id)?;

        if let Some(email) = provider_email {
            let mut email_index = txn.open_table(RECOMMENDATION_EMAIL_INDEX_TABLE)?;
            email_index.insert(email, id)?;
        }
        Ok(())
    }

    pub fn find_by_provider_email_in(txn: &WriteTransaction, email: &str) -> Result<Option<String>> {
        let index = txn.open_table(RECOMMENDATION_EMAIL_INDEX_TABLE)?;
        Ok(index.get(email)?.map(|value| value.value().to_string()))
    }

    pub fn share_in(txn: &WriteTransaction, id: &str, community: &str) -> Result<bool> {
        let mut shares = txn.open_table(RECOMMENDATION_SHARES_TABLE)?;
        let key = composite_key(community, id);
        if shares.get(key.as_str())?.is_some() {
            return Ok(false);
        }
        shares.insert(key.as_str(), id)?;

        let mut reverse = txn.open_table(RECOMMENDATION_SHARES_REVERSE_TABLE)?;
        let reverse_key = composite_key(id, community);
        reverse.insert(reverse_key.as_str(), community)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_storage() -> (RecommendationStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
        (RecommendationStorage::new(db).unwrap(), temp_dir)
    }

    #[test]
    fn test_put_indexes_owner_and_email() {
        let (storage, _tmp) = create_test_storage();

        storage
            .put_raw("r1", "alice", Some("joe@plumbing.test"), b"joe")
            .unwrap();
        storage.put_raw("r2", "alice", None, b"ann").unwrap();
        storage.put_raw("r3", "bob", None, b"bo").unwrap();

        assert_eq!(
            storage.find_by_provider_email("joe@plumbing.test").unwrap(),
            Some("r1".to_string())
        );
        assert_eq!(storage.list_by_owner_raw("alice").unwrap().len(), 2);
        assert_eq!(storage.list_by_owner_raw("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_share_is_idempotent_and_bidirectional() {
        let (storage, _tmp) = create_test_storage();
        storage.put_raw("r1", "alice", None, b"x").unwrap();

        assert!(storage.share("r1", "c1").unwrap());
        assert!(!storage.share("r1", "c1").unwrap());
        assert!(storage.share("r1", "c2").unwrap());

        assert_eq!(
            storage.list_shares("r1").unwrap(),
            vec!["c1".to_string(), "c2".to_string()]
        );
        assert_eq!(storage.list_shared_into("c2").unwrap(), vec!["r1".to_string()]);
    }
}
