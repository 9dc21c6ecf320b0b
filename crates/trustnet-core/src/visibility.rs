//! Who may see a recommendation.
//!
//! A recommendation is visible to a viewer when any of these holds: the
//! viewer owns it, it is public, it is scoped to connections and owner and
//! viewer are connected, or it is scoped to communities and shared into one
//! where the viewer is an approved member.

use crate::error::Result;
use crate::models::{CommunityId, Recommendation, UserId, Visibility};
use crate::storage::{CommunityStorage, ConnectionStorage};
use std::collections::BTreeSet;

/// The viewer-side facts the resolver needs.
pub trait ViewerRelations {
    fn viewer(&self) -> &UserId;

    fn is_connected_to(&self, owner: &UserId) -> Result<bool>;

    fn is_member_of_any(&self, communities: &BTreeSet<CommunityId>) -> Result<bool>;
}

pub fn is_visible<R: ViewerRelations + ?Sized>(
    recommendation: &Recommendation,
    relations: &R,
) -> Result<bool> {
    if &recommendation.owner == relations.viewer() {
        return Ok(true);
    }
    match recommendation.visibility {
        Visibility::Private => Ok(false),
        Visibility::Public => Ok(true),
        Visibility::Connections => relations.is_connected_to(&recommendation.owner),
        Visibility::Communities => relations.is_member_of_any(&recommendation.communities),
    }
}

/// Keep only the recommendations visible through `relations`.
pub fn filter_visible<R: ViewerRelations + ?Sized>(
    recommendations: Vec<Recommendation>,
    relations: &R,
) -> Result<Vec<Recommendation>> {
    let mut visible = Vec::new();
    for recommendation in recommendations {
        if is_visible(&recommendation, relations)? {
            visible.push(recommendation);
        }
    }
    Ok(visible)
}

/// Viewer relations indexed once up front, for batch evaluation.
#[derive(Debug, Clone)]
pub struct ViewerScope {
    viewer: UserId,
    connections: BTreeSet<UserId>,
    communities: BTreeSet<CommunityId>,
}

impl ViewerScope {
    pub fn new(
        viewer: UserId,
        connections: BTreeSet<UserId>,
        communities: BTreeSet<CommunityId>,
    ) -> Self {
        Self {
            viewer,
            connections,
            communities,
        }
    }

    pub fn load(
        viewer: &UserId,
        connections: &ConnectionStorage,
        communities: &CommunityStorage,
    ) -> Result<Self> {
        Ok(Self::new(
            viewer.clone(),
            connections.neighbors_of(viewer)?,
            communities.approved_communities_of(viewer)?,
        ))
    }
}

impl ViewerRelations for ViewerScope {
    fn viewer(&self) -> &UserId {
        &self.viewer
    }

    fn is_connected_to(&self, owner: &UserId) -> Result<bool> {
        Ok(self.connections.contains(owner))
    }

    fn is_member_of_any(&self, communities: &BTreeSet<CommunityId>) -> Result<bool> {
        Ok(!self.communities.is_disjoint(communities))
    }
}

/// Viewer relations answered by querying storage on demand.
pub struct LiveRelations<'a> {
    viewer: &'a UserId,
    connections: &'a ConnectionStorage,
    communities: &'a CommunityStorage,
}

impl<'a> LiveRelations<'a> {
    pub fn new(
        viewer: &'a UserId,
        connections: &'a ConnectionStorage,
        communities: &'a CommunityStorage,
    ) -> Self {
        Self {
            viewer,
            connections,
            communities,
        }
    }
}

impl ViewerRelations for LiveRelations<'_> {
    fn viewer(&self) -> &UserId {
        self.viewer
    }

    fn is_connected_to(&self, owner: &UserId) -> Result<bool> {
        self.connections.is_connected(owner, self.viewer)
    }

    fn is_member_of_any(&self, communities: &BTreeSet<CommunityId>) -> Result<bool> {
        for community in communities {
            if self.communities.is_approved_member(community, self.viewer)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderDetails;

    fn recommendation(owner: &str, visibility: Visibility, shared: &[&str]) -> Recommendation {
        let mut rec = Recommendation::new(
            UserId::from(owner),
            ProviderDetails {
                name: "Provider".to_string(),
                ..Default::default()
            },
            BTreeSet::new(),
            visibility,
        );
        rec.communities = shared.iter().map(|c| CommunityId::from(*c)).collect();
        rec
    }

    fn scope(viewer: &str, connections: &[&str], communities: &[&str]) -> ViewerScope {
        ViewerScope::new(
            UserId::from(viewer),
            connections.iter().map(|u| UserId::from(*u)).collect(),
            communities.iter().map(|c| CommunityId::from(*c)).collect(),
        )
    }

    #[test]
    fn test_owner_always_sees_own() {
        let rec = recommendation("owner", Visibility::Private, &[]);
        assert!(is_visible(&rec, &scope("owner", &[], &[])).unwrap());
        assert!(!is_visible(&rec, &scope("friend", &["owner"], &[])).unwrap());
    }

    #[test]
    fn test_public_visible_to_anyone() {
        let rec = recommendation("owner", Visibility::Public, &[]);
        assert!(is_visible(&rec, &scope("stranger", &[], &[])).unwrap());
    }

    #[test]
    fn test_connections_scope() {
        let rec = recommendation("owner", Visibility::Connections, &["c1"]);
        assert!(is_visible(&rec, &scope("friend", &["owner"], &[])).unwrap());
        assert!(!is_visible(&rec, &scope("member", &[], &["c1"])).unwrap());
    }

    #[test]
    fn test_communities_scope() {
        let rec = recommendation("owner", Visibility::Communities, &["c1", "c2"]);
        assert!(is_visible(&rec, &scope("member", &[], &["c2"])).unwrap());
        assert!(!is_visible(&rec, &scope("friend", &["owner"], &["c3"])).unwrap());

        let unshared = recommendation("owner", Visibility::Communities, &[]);
        assert!(!is_visible(&unshared, &scope("member", &[], &["c1"])).unwrap());
    }

    #[test]
    fn test_filter_visible_keeps_order() {
        let recs = vec![
            recommendation("owner", Visibility::Public, &[]),
            recommendation("owner", Visibility::Private, &[]),
            recommendation("owner", Visibility::Connections, &[]),
        ];
        let visible = filter_visible(recs, &scope("friend", &["owner"], &[])).unwrap();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].visibility, Visibility::Public);
        assert_eq!(visible[1].visibility, Visibility::Connections);
    }
}
