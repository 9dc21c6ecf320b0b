//! User storage - byte-level API for user records and the external identity index.

use crate::SimpleStorage;
use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Index: external identity -> user id
const USER_IDENTITY_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("user_identity_index");

/// Low-level user storage
#[derive(Debug, Clone)]
pub struct UserStorage {
    db: Arc<Database>,
}

impl SimpleStorage for UserStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = USERS_TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

impl UserStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS_TABLE)?;
        write_txn.open_table(USER_IDENTITY_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store a user row and (re)point its identity index entry.
    pub fn put_raw(&self, id: &str, external_identity: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::put_in(&write_txn, id, external_identity, data)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Look up the user id bound to an external identity.
    pub fn find_id_by_identity(&self, external_identity: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_IDENTITY_INDEX_TABLE)?;
        Ok(index
            .get(external_identity)?
            .map(|value| value.value().to_string()))
    }

    // ============== Transaction-scoped Operations ==============

    pub fn put_in(
        txn: &WriteTransaction,
        id: &str,
        external_identity: &str,
        data: &[u8],
    ) -> Result<()> {
        let mut table = txn.open_table(USERS_TABLE)?;
        table.insert(id, data)?;
        let mut index = txn.open_table(USER_IDENTITY_INDEX_TABLE)?;
        index.insert(external_identity, id)?;
        Ok(())
    }

    pub fn find_id_by_identity_in(
        txn: &WriteTransaction,
        external_identity: &str,
    ) -> Result<Option<String>> {
        let index = txn.open_table(USER_IDENTITY_INDEX_TABLE)?;
        Ok(index
            .get(external_identity)?
            .map(|value| value.value().to_string()))
    }
}
