//! Community membership storage.
//!
//! At most one row exists per (community, user): the primary key is the
//! composite "{community}:{user}", so a second insert for the same pair
//! overwrites instead of duplicating.

use crate::range_utils::{composite_key, left_part_range, split_key};
use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

/// Memberships table: "{community}:{user}" -> JSON CommunityMembership
const MEMBERSHIPS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("memberships");
/// Index: "{user}:{community}" -> community id
const MEMBERSHIP_USER_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("membership_user_index");

/// Low-level membership storage
#[derive(Debug, Clone)]
pub struct MembershipStorage {
    db: Arc<Database>,
}

impl MembershipStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(MEMBERSHIPS_TABLE)?;
        write_txn.open_table(MEMBERSHIP_USER_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn put_raw(&self, community: &str, user: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::put_in(&write_txn, community, user, data)?;
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_raw(&self, community: &str, user: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERSHIPS_TABLE)?;
        let key = composite_key(community, user);
        Ok(table.get(key.as_str())?.map(|value| value.value().to_vec()))
    }

    /// All membership rows of a community, as (user id, raw data).
    pub fn list_by_community_raw(&self, community: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERSHIPS_TABLE)?;
        let (start, end) = left_part_range(community);

        let mut rows = Vec::new();
        for item in table.range(start.as_str()..end.as_str())? {
            let (key, value) = item?;
            if let Some((_, user)) = split_key(key.value()) {
                rows.push((user.to_string(), value.value().to_vec()));
            }
        }
        Ok(rows)
    }

    /// All membership rows of a user, as (community id, raw data).
    pub fn list_by_user_raw(&self, user: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(MEMBERSHIP_USER_INDEX_TABLE)?;
        let table = read_txn.open_table(MEMBERSHIPS_TABLE)?;
        let (start, end) = left_part_range(user);

        let mut rows = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, community) = item?;
            let community = community.value();
            let key = composite_key(community, user);
            if let Some(data) = table.get(key.as_str())? {
                rows.push((community.to_string(), data.value().to_vec()));
            }
        }
        Ok(rows)
    }

    // ============== Transaction-scoped Operations ==============

    pub fn put_in(txn: &WriteTransaction, community: &str, user: &str, data: &[u8]) -> Result<()> {
        let mut table = txn.open_table(MEMBERSHIPS_TABLE)?;
        let key = composite_key(community, user);
        table.insert(key.as_str(), data)?;

        let mut index = txn.open_table(MEMBERSHIP_USER_INDEX_TABLE)?;
        let index_key = composite_key(user, community);
        index.insert(index_key.as_str(), community)?;
        Ok(())
    }

    pub fn get_raw_in(txn: &WriteTransaction, community: &str, user: &str) -> Result<Option<Vec<u8>>> {
        let table = txn.open_table(MEMBERSHIPS_TABLE)?;
        let key = composite_key(community, user);
        Ok(table.get(key.as_str())?.map(|value| value.value().to_vec()))
    }

    pub fn list_by_community_in(
        txn: &WriteTransaction,
        community: &str,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let table = txn.open_table(MEMBERSHIPS_TABLE)?;
        let (start, end) = left_part_range(community);

        let mut rows = Vec::new();
        for item in table.range(start.as_str()..end.as_str())? {
            let (key, value) = item?;
            if let Some((_, user)) = split_key(key.value()) {
                rows.push((user.to_string(), value.value().to_vec()));
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_storage() -> (MembershipStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
        (MembershipStorage::new(db).unwrap(), temp_dir)
    }

    #[test]
    fn test_one_row_per_pair() {
        let (storage, _tmp) = create_test_storage();

        storage.put_raw("c1", "u1", b"requested").unwrap();
        storage.put_raw("c1", "u1", b"approved").unwrap();

        let rows = storage.list_by_community_raw("c1").unwrap();
        assert_eq!(rows, vec![("u1".to_string(), b"approved".to_vec())]);
    }

    #[test]
    fn test_list_by_user_spans_communities() {
        let (storage, _tmp) = create_test_storage();

        storage.put_raw("c1", "u1", b"a").unwrap();
        storage.put_raw("c2", "u1", b"b").unwrap();
        storage.put_raw("c2", "u2", b"c").unwrap();

        let mut communities: Vec<String> = storage
            .list_by_user_raw("u1")
            .unwrap()
            .into_iter()
            .map(|(community, _)| community)
            .collect();
        communities.sort();
        assert_eq!(communities, vec!["c1".to_string(), "c2".to_string()]);
        assert_eq!(storage.list_by_community_raw("c2").unwrap().len(), 2);
    }
}
