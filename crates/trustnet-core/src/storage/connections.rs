//! Typed connection storage.
//!
//! Edges are stored directed; every read treats them as undirected.

use super::{decode, encode};
use crate::error::Result;
use crate::graph::Neighbors;
use crate::models::{Connection, UserId};
use chrono::{DateTime, Utc};
use redb::WriteTransaction;
use std::collections::BTreeSet;
use std::sync::Arc;

type RawConnections = trustnet_storage::ConnectionStorage;

#[derive(Clone)]
pub struct ConnectionStorage {
    raw: Arc<trustnet_storage::Storage>,
}

impl ConnectionStorage {
    pub fn new(raw: Arc<trustnet_storage::Storage>) -> Self {
        Self { raw }
    }

    /// Insert `(a, b)` unless an edge exists in either direction.
    ///
    /// Returns `true` when a new edge was written.
    pub fn connect(&self, a: &UserId, b: &UserId) -> Result<bool> {
        let now = Utc::now();
        self.raw.atomic(|txn| {
            if Self::is_connected_in(txn, a, b)? {
                return Ok(false);
            }
            let edge = Connection::accepted(a.clone(), b.clone(), now);
            Ok(RawConnections::insert_edge_in(
                txn,
                a.as_str(),
                b.as_str(),
                &encode(&edge)?,
            )?)
        })
    }

    pub fn is_connected(&self, a: &UserId, b: &UserId) -> Result<bool> {
        Ok(self.accepted_edge(a, b)? || self.accepted_edge(b, a)?)
    }

    /// Every user sharing an accepted edge with `user`, in either direction.
    pub fn neighbors_of(&self, user: &UserId) -> Result<BTreeSet<UserId>> {
        let mut neighbors = BTreeSet::new();
        let outgoing = self.raw.connections.list_outgoing_raw(user.as_str())?;
        let incoming = self.raw.connections.list_incoming_raw(user.as_str())?;

        for (peer, bytes) in outgoing.into_iter().chain(incoming) {
            let edge: Connection = decode(&bytes)?;
            if edge.is_accepted() {
                neighbors.insert(UserId::from(peer));
            }
        }
        neighbors.remove(user);
        Ok(neighbors)
    }

    fn accepted_edge(&self, from: &UserId, to: &UserId) -> Result<bool> {
        match self.raw.connections.get_edge_raw(from.as_str(), to.as_str())? {
            Some(bytes) => Ok(decode::<Connection>(&bytes)?.is_accepted()),
            None => Ok(false),
        }
    }

    // ============== Transaction-scoped Operations ==============

    pub fn is_connected_in(txn: &WriteTransaction, a: &UserId, b: &UserId) -> Result<bool> {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(bytes) = RawConnections::get_edge_raw_in(txn, from.as_str(), to.as_str())?
                && decode::<Connection>(&bytes)?.is_accepted()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Write the symmetric pair `(a, b)` and `(b, a)` unless the two users
    /// are already connected. Returns `true` when the pair was written.
    pub fn connect_pair_in(
        txn: &WriteTransaction,
        a: &UserId,
        b: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        if Self::is_connected_in(txn, a, b)? {
            return Ok(false);
        }
        let forward = Connection::accepted(a.clone(), b.clone(), at);
        let backward = Connection::accepted(b.clone(), a.clone(), at);
        RawConnections::insert_edge_in(txn, a.as_str(), b.as_str(), &encode(&forward)?)?;
        RawConnections::insert_edge_in(txn, b.as_str(), a.as_str(), &encode(&backward)?)?;
        Ok(true)
    }
}

impl Neighbors for ConnectionStorage {
    fn neighbors(&self, user: &UserId) -> Result<BTreeSet<UserId>> {
        self.neighbors_of(user)
    }
}
