//! First- and second-degree neighborhoods over the connection graph.
//!
//! Traversal is an explicit two-hop breadth-first expansion. Adjacency comes
//! from a [`Neighbors`] source, which is the redb edge tables in production
//! and a plain map in tests.

use crate::error::Result;
use crate::models::{Degree, UserId};
use std::collections::{BTreeMap, BTreeSet};

/// Undirected adjacency over accepted edges.
pub trait Neighbors {
    fn neighbors(&self, user: &UserId) -> Result<BTreeSet<UserId>>;
}

pub struct ConnectionGraph<'a, N: Neighbors + ?Sized> {
    source: &'a N,
}

impl<'a, N: Neighbors + ?Sized> ConnectionGraph<'a, N> {
    pub fn new(source: &'a N) -> Self {
        Self { source }
    }

    pub fn is_connected(&self, a: &UserId, b: &UserId) -> Result<bool> {
        Ok(self.source.neighbors(a)?.contains(b))
    }

    pub fn first_degree(&self, user: &UserId) -> Result<BTreeSet<UserId>> {
        let mut first = self.source.neighbors(user)?;
        first.remove(user);
        Ok(first)
    }

    /// Users two hops away, excluding `user` and its first-degree neighbors.
    pub fn second_degree(&self, user: &UserId) -> Result<BTreeSet<UserId>> {
        let first = self.first_degree(user)?;
        self.expand(user, &first)
    }

    pub fn degree_of(&self, from: &UserId, to: &UserId) -> Result<Option<Degree>> {
        if from == to {
            return Ok(None);
        }
        let first = self.first_degree(from)?;
        if first.contains(to) {
            return Ok(Some(Degree::First));
        }
        for neighbor in &first {
            if self.source.neighbors(neighbor)?.contains(to) {
                return Ok(Some(Degree::Second));
            }
        }
        Ok(None)
    }

    /// Candidate pool: every first- and second-degree user with its degree.
    pub fn network(&self, user: &UserId) -> Result<BTreeMap<UserId, Degree>> {
        let first = self.first_degree(user)?;
        let second = self.expand(user, &first)?;

        let mut network: BTreeMap<UserId, Degree> = first
            .into_iter()
            .map(|id| (id, Degree::First))
            .collect();
        network.extend(second.into_iter().map(|id| (id, Degree::Second)));
        Ok(network)
    }

    fn expand(&self, user: &UserId, first: &BTreeSet<UserId>) -> Result<BTreeSet<UserId>> {
        let mut second = BTreeSet::new();
        for neighbor in first {
            for candidate in self.source.neighbors(neighbor)? {
                if &candidate != user && !first.contains(&candidate) {
                    second.insert(candidate);
                }
            }
        }
        Ok(second)
    }
}

/// In-memory adjacency, used by tests and for ad-hoc graphs.
#[derive(Debug, Default, Clone)]
pub struct AdjacencyMap {
    edges: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl AdjacencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, a: &UserId, b: &UserId) {
        if a == b {
            return;
        }
        self.edges.entry(a.clone()).or_default().insert(b.clone());
        self.edges.entry(b.clone()).or_default().insert(a.clone());
    }
}

impl Neighbors for AdjacencyMap {
    fn neighbors(&self, user: &UserId) -> Result<BTreeSet<UserId>> {
        Ok(self.edges.get(user).cloned().unwrap_or_default())
    }
}
