//! Ask storage - byte-level API for asks, their asker/recipient indexes and
//! the append-only response log.

use crate::SimpleStorage;
use crate::range_utils::{composite_key, left_part_range};
use anyhow::Result;
use redb::{Database, ReadableDatabase, TableDefinition, WriteTransaction};
use std::sync::Arc;

const ASKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("asks");
/// Index: "{asker}:{ask}" -> ask id
const ASK_ASKER_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("ask_asker_index");
/// Index: "{recipient}:{ask}" -> ask id
const ASK_RECIPIENT_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("ask_recipient_index");
/// Responses table: response id -> JSON AskResponse
const ASK_RESPONSES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("ask_responses");
/// Index: "{ask}:{response}" -> response id
const ASK_RESPONSE_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("ask_response_index");

/// Low-level ask storage
#[derive(Debug, Clone)]
pub struct AskStorage {
    db: Arc<Database>,
}

impl SimpleStorage for AskStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = ASKS_TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

impl AskStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ASKS_TABLE)?;
        write_txn.open_table(ASK_ASKER_INDEX_TABLE)?;
        write_txn.open_table(ASK_RECIPIENT_INDEX_TABLE)?;
        write_txn.open_table(ASK_RESPONSES_TABLE)?;
        write_txn.open_table(ASK_RESPONSE_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    // ============== Ask Operations ==============

    /// Store a new ask and index it under its asker and every recipient.
    pub fn create_raw(&self, id: &str, asker: &str, recipients: &[&str], data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::create_in(&write_txn, id, asker, recipients, data)?;
        write_txn.commit()?;
        Ok(())
    }

    pub fn list_by_asker_raw(&self, asker: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_asks_via_index(ASK_ASKER_INDEX_TABLE, asker)
    }

    pub fn list_by_recipient_raw(&self, recipient: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.list_asks_via_index(ASK_RECIPIENT_INDEX_TABLE, recipient)
    }

    fn list_asks_via_index(
        &self,
        index_def: TableDefinition<'static, &'static str, &'static str>,
        left: &str,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(index_def)?;
        let table = read_txn.open_table(ASKS_TABLE)?;
        let (start, end) = left_part_range(left);

        let mut asks = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, id) = item?;
            if let Some(data) = table.get(id.value())? {
                asks.push((id.value().to_string(), data.value().to_vec()));
            }
        }
        Ok(asks)
    }

    // ============== Response Operations ==============

    pub fn put_response_raw(&self, id: &str, ask_id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ASK_RESPONSES_TABLE)?;
            table.insert(id, data)?;

            let mut index = write_txn.open_table(ASK_RESPONSE_INDEX_TABLE)?;
            let index_key = composite_key(ask_id, id);
            index.insert(index_key.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn list_responses_raw(&self, ask_id: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ASK_RESPONSE_INDEX_TABLE)?;
        let table = read_txn.open_table(ASK_RESPONSES_TABLE)?;
        let (start, end) = left_part_range(ask_id);

        let mut responses = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (_, id) = item?;
            if let Some(data) = table.get(id.value())? {
                responses.push((id.value().to_string(), data.value().to_vec()));
            }
        }
        Ok(responses)
    }

    // ============== Transaction-scoped Operations ==============

    pub fn create_in(
        txn: &WriteTransaction,
        id: &str,
        asker: &str,
        recipients: &[&str],
        data: &[u8],
    ) -> Result<()> {
        let mut table = txn.open_table(ASKS_TABLE)?;
        table.insert(id, data)?;

        let mut by_asker = txn.open_table(ASK_ASKER_INDEX_TABLE)?;
        let asker_key = composite_key(asker, id);
        by_asker.insert(asker_key.as_str(), id)?;

        let mut by_recipient = txn.open_table(ASK_RECIPIENT_INDEX_TABLE)?;
        for recipient in recipients {
            let recipient_key = composite_key(recipient, id);
            by_recipient.insert(recipient_key.as_str(), id)?;
        }
        Ok(())
    }
}
