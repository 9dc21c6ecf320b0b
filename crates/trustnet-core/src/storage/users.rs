//! Typed user directory storage.

use super::{decode, encode};
use crate::error::{CoreError, Result};
use crate::models::{User, UserId, UserProfile, UserSignals};
use crate::scoring::UserDirectory;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use trustnet_storage::SimpleStorage;

type RawUsers = trustnet_storage::UserStorage;

#[derive(Clone)]
pub struct UserStorage {
    raw: Arc<trustnet_storage::Storage>,
}

impl UserStorage {
    pub fn new(raw: Arc<trustnet_storage::Storage>) -> Self {
        Self { raw }
    }

    /// Find the user behind an external identity, creating it on first sight.
    ///
    /// Returns the user and whether it was created by this call.
    pub fn resolve(&self, external_identity: &str, profile: UserProfile) -> Result<(User, bool)> {
        self.raw.atomic(|txn| {
            if let Some(id) = RawUsers::find_id_by_identity_in(txn, external_identity)? {
                let bytes = RawUsers::get_raw_in(txn, &id)?
                    .ok_or_else(|| CoreError::not_found(format!("user {id}")))?;
                return Ok((decode(&bytes)?, false));
            }

            let user = User {
                id: UserId::generate(),
                external_identity: external_identity.to_string(),
                display_name: profile.display_name,
                profile_image: profile.profile_image,
                trust_score: 0.0,
                state: profile.state,
                location: profile.location,
                response_rate: None,
                last_active_at: None,
                created_at: Utc::now(),
            };
            RawUsers::put_in(txn, user.id.as_str(), external_identity, &encode(&user)?)?;
            Ok((user, true))
        })
    }

    pub fn get(&self, id: &UserId) -> Result<Option<User>> {
        match self.raw.users.get_raw(id.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but missing users are an error.
    pub fn require(&self, id: &UserId) -> Result<User> {
        self.get(id)?
            .ok_or_else(|| CoreError::not_found(format!("user {id}")))
    }

    pub fn exists(&self, id: &UserId) -> Result<bool> {
        Ok(self.raw.users.exists(id.as_str())?)
    }

    /// Record activity at `at`.
    pub fn touch_activity(&self, id: &UserId, at: DateTime<Utc>) -> Result<User> {
        self.modify(id, |user| {
            user.last_active_at = Some(at);
            Ok(())
        })
    }

    pub fn update_signals(&self, id: &UserId, signals: &UserSignals) -> Result<User> {
        if let Some(trust) = signals.trust_score
            && !(trust.is_finite() && trust >= 0.0)
        {
            return Err(CoreError::validation("trust score must be a non-negative number"));
        }
        if let Some(rate) = signals.response_rate
            && !(0.0..=1.0).contains(&rate)
        {
            return Err(CoreError::validation("response rate must be between 0 and 1"));
        }

        self.modify(id, |user| {
            if let Some(trust) = signals.trust_score {
                user.trust_score = trust;
            }
            if let Some(rate) = signals.response_rate {
                user.response_rate = Some(rate);
            }
            Ok(())
        })
    }

    fn modify(&self, id: &UserId, f: impl FnOnce(&mut User) -> Result<()>) -> Result<User> {
        self.raw.atomic(|txn| {
            let bytes = RawUsers::get_raw_in(txn, id.as_str())?
                .ok_or_else(|| CoreError::not_found(format!("user {id}")))?;
            let mut user: User = decode(&bytes)?;
            f(&mut user)?;
            RawUsers::put_raw_in(txn, id.as_str(), &encode(&user)?)?;
            Ok(user)
        })
    }
}

impl UserDirectory for UserStorage {
    fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.get(id)
    }
}
