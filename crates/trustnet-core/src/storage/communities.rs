//! Typed community and membership storage, including clique formation on
//! approval.

use super::{ConnectionStorage, decode, encode};
use crate::error::{CoreError, Result};
use crate::models::{Community, CommunityId, CommunityMembership, MembershipStatus, UserId};
use chrono::Utc;
use redb::WriteTransaction;
use std::collections::BTreeSet;
use std::sync::Arc;
use trustnet_storage::SimpleStorage;

type RawCommunities = trustnet_storage::CommunityStorage;
type RawMemberships = trustnet_storage::MembershipStorage;

/// Result of approving a join request.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub membership: CommunityMembership,
    /// Members that got a fresh edge pair with the approved user.
    pub new_connections: Vec<UserId>,
}

#[derive(Clone)]
pub struct CommunityStorage {
    raw: Arc<trustnet_storage::Storage>,
}

impl CommunityStorage {
    pub fn new(raw: Arc<trustnet_storage::Storage>) -> Self {
        Self { raw }
    }

    /// Create a community and its owner's approved membership together.
    pub fn create(&self, owner: &UserId, name: String) -> Result<Community> {
        let now = Utc::now();
        let community = Community {
            id: CommunityId::generate(),
            name,
            created_by: owner.clone(),
            created_at: now,
        };
        let membership = CommunityMembership::owner(owner.clone(), community.id.clone(), now);

        self.raw.atomic(|txn| {
            RawCommunities::put_raw_in(txn, community.id.as_str(), &encode(&community)?)?;
            RawMemberships::put_in(
                txn,
                community.id.as_str(),
                owner.as_str(),
                &encode(&membership)?,
            )?;
            Ok::<_, CoreError>(())
        })?;

        Ok(community)
    }

    pub fn get(&self, id: &CommunityId) -> Result<Option<Community>> {
        match self.raw.communities.get_raw(id.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: &CommunityId) -> Result<Community> {
        self.get(id)?
            .ok_or_else(|| CoreError::not_found(format!("community {id}")))
    }

    pub fn membership(
        &self,
        community: &CommunityId,
        user: &UserId,
    ) -> Result<Option<CommunityMembership>> {
        match self
            .raw
            .memberships
            .get_raw(community.as_str(), user.as_str())?
        {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn is_approved_member(&self, community: &CommunityId, user: &UserId) -> Result<bool> {
        Ok(self
            .membership(community, user)?
            .is_some_and(|membership| membership.is_approved()))
    }

    /// File a join request.
    pub fn request_join(&self, community: &CommunityId, user: &UserId) -> Result<CommunityMembership> {
        let now = Utc::now();
        self.raw.atomic(|txn| {
            if !RawCommunities::exists_in(txn, community.as_str())? {
                return Err(CoreError::not_found(format!("community {community}")));
            }
            if let Some(existing) = Self::membership_in(txn, community, user)? {
                return Err(match existing.status {
                    MembershipStatus::Approved => CoreError::AlreadyMember,
                    MembershipStatus::Requested => CoreError::AlreadyRequested,
                });
            }

            let membership = CommunityMembership::requested(user.clone(), community.clone(), now);
            RawMemberships::put_in(txn, community.as_str(), user.as_str(), &encode(&membership)?)?;
            Ok(membership)
        })
    }

    /// Approve `target`'s pending request and connect them to every other
    /// approved member. All writes share one transaction.
    pub fn approve(
        &self,
        community_id: &CommunityId,
        target: &UserId,
        approver: &UserId,
    ) -> Result<ApprovalOutcome> {
        let now = Utc::now();
        self.raw.atomic(|txn| {
            let bytes = RawCommunities::get_raw_in(txn, community_id.as_str())?
                .ok_or_else(|| CoreError::not_found(format!("community {community_id}")))?;
            let community: Community = decode(&bytes)?;
            if &community.created_by != approver {
                return Err(CoreError::NotAuthorized);
            }

            let mut membership = match Self::membership_in(txn, community_id, target)? {
                Some(row) if row.status == MembershipStatus::Requested => row,
                _ => return Err(CoreError::NoPendingRequest),
            };
            membership.status = MembershipStatus::Approved;
            membership.approved_at = Some(now);
            RawMemberships::put_in(
                txn,
                community_id.as_str(),
                target.as_str(),
                &encode(&membership)?,
            )?;

            let mut new_connections = Vec::new();
            for (user, bytes) in RawMemberships::list_by_community_in(txn, community_id.as_str())? {
                let member = UserId::from(user);
                if &member == target || !decode::<CommunityMembership>(&bytes)?.is_approved() {
                    continue;
                }
                if ConnectionStorage::connect_pair_in(txn, target, &member, now)? {
                    new_connections.push(member);
                }
            }

            Ok(ApprovalOutcome {
                membership,
                new_connections,
            })
        })
    }

    /// Approved members of a community.
    pub fn list_members(&self, community: &CommunityId) -> Result<Vec<CommunityMembership>> {
        self.list_with_status(community, MembershipStatus::Approved)
    }

    /// Outstanding join requests of a community.
    pub fn list_pending(&self, community: &CommunityId) -> Result<Vec<CommunityMembership>> {
        self.list_with_status(community, MembershipStatus::Requested)
    }

    /// Communities in which `user` is an approved member.
    pub fn approved_communities_of(&self, user: &UserId) -> Result<BTreeSet<CommunityId>> {
        let mut communities = BTreeSet::new();
        for (community, bytes) in self.raw.memberships.list_by_user_raw(user.as_str())? {
            if decode::<CommunityMembership>(&bytes)?.is_approved() {
                communities.insert(CommunityId::from(community));
            }
        }
        Ok(communities)
    }

    fn list_with_status(
        &self,
        community: &CommunityId,
        status: MembershipStatus,
    ) -> Result<Vec<CommunityMembership>> {
        let mut rows = Vec::new();
        for (_, bytes) in self.raw.memberships.list_by_community_raw(community.as_str())? {
            let membership: CommunityMembership = decode(&bytes)?;
            if membership.status == status {
                rows.push(membership);
            }
        }
        rows.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(rows)
    }

    fn membership_in(
        txn: &WriteTransaction,
        community: &CommunityId,
        user: &UserId,
    ) -> Result<Option<CommunityMembership>> {
        match RawMemberships::get_raw_in(txn, community.as_str(), user.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}
