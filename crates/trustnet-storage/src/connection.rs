//! Connection storage - directed edges plus a reverse index so both
//! directions of a user's adjacency can be scanned by prefix.

use crate::range_utils::{composite_key, left_part_range, split_key};
use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

/// Edges table: "{from}:{to}" -> JSON Connection
const CONNECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("connections");
/// Reverse index: "{to}:{from}" -> "{from}:{to}"
const CONNECTION_REVERSE_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("connection_reverse_index");

/// Low-level connection storage
#[derive(Debug, Clone)]
pub struct ConnectionStorage {
    db: Arc<Database>,
}

impl ConnectionStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(CONNECTIONS_TABLE)?;
        write_txn.open_table(CONNECTION_REVERSE_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert the directed edge `from -> to` unless it already exists.
    ///
    /// Returns `true` when a new row was written.
    pub fn insert_edge(&self, from: &str, to: &str, data: &[u8]) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let inserted = Self::insert_edge_in(&write_txn, from, to, data)?;
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Get the raw data of the directed edge `from -> to`.
    pub fn get_edge_raw(&self, from: &str, to: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONNECTIONS_TABLE)?;
        let key = composite_key(from, to);
        Ok(table.get(key.as_str())?.map(|value| value.value().to_vec()))
    }

    /// Edges leaving `user`, as (peer id, raw edge data).
    pub fn list_outgoing_raw(&self, user: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONNECTIONS_TABLE)?;
        let (start, end) = left_part_range(user);

        let mut edges = Vec::new();
        for item in table.range(start.as_str()..end.as_str())? {
            let (key, value) = item?;
            if let Some((_, peer)) = split_key(key.value()) {
                edges.push((peer.to_string(), value.value().to_vec()));
            }
        }
        Ok(edges)
    }

    /// Edges arriving at `user`, as (peer id, raw edge data).
    pub fn list_incoming_raw(&self, user: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(CONNECTION_REVERSE_INDEX_TABLE)?;
        let table = read_txn.open_table(CONNECTIONS_TABLE)?;
        let (start, end) = left_part_range(user);

        let mut edges = Vec::new();
        for item in index.range(start.as_str()..end.as_str())? {
            let (key, edge_key) = item?;
            let Some((_, peer)) = split_key(key.value()) else {
                continue;
            };
            if let Some(data) = table.get(edge_key.value())? {
                edges.push((peer.to_string(), data.value().to_vec()));
            }
        }
        Ok(edges)
    }

    // ============== Transaction-scoped Operations ==============

    pub fn insert_edge_in(txn: &WriteTransaction, from: &str, to: &str, data: &[u8]) -> Result<bool> {
        let key = composite_key(from, to);
        let mut table = txn.open_table(CONNECTIONS_TABLE)?;
        if table.get(key.as_str())?.is_some() {
            return Ok(false);
        }
        table.insert(key.as_str(), data)?;

        let mut index = txn.open_table(CONNECTION_REVERSE_INDEX_TABLE)?;
        let reverse_key = composite_key(to, from);
        index.insert(reverse_key.as_str(), key.as_str())?;
        Ok(true)
    }

    pub fn get_edge_raw_in(txn: &WriteTransaction, from: &str, to: &str) -> Result<Option<Vec<u8>>> {
        let table = txn.open_table(CONNECTIONS_TABLE)?;
        let key = composite_key(from, to);
        Ok(table.get(key.as_str())?.map(|value| value.value().to_vec()))
    }
}
