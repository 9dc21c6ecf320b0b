//! Typed ask storage and the transactional steps of the ask lifecycle.

use super::{RecommendationStorage, decode, encode};
use crate::error::{CoreError, Result};
use crate::models::{
    Ask, AskId, AskResponse, InboundAsk, ProviderDetails, Review, ReviewDetails, UserId,
    normalize_tag,
};
use redb::WriteTransaction;
use std::collections::BTreeSet;
use std::sync::Arc;
use trustnet_storage::SimpleStorage;

type RawAsks = trustnet_storage::AskStorage;

/// Everything written by a successful fulfillment.
#[derive(Debug, Clone)]
pub struct Fulfillment {
    pub ask: Ask,
    pub review: Review,
}

#[derive(Clone)]
pub struct AskStorage {
    raw: Arc<trustnet_storage::Storage>,
}

impl AskStorage {
    pub fn new(raw: Arc<trustnet_storage::Storage>) -> Self {
        Self { raw }
    }

    pub fn create(&self, ask: &Ask) -> Result<()> {
        let recipients: Vec<&str> = ask.recipients.iter().map(UserId::as_str).collect();
        self.raw.asks.create_raw(
            ask.id.as_str(),
            ask.asker.as_str(),
            &recipients,
            &encode(ask)?,
        )?;
        Ok(())
    }

    pub fn get(&self, id: &AskId) -> Result<Option<Ask>> {
        match self.raw.asks.get_raw(id.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn require(&self, id: &AskId) -> Result<Ask> {
        self.get(id)?
            .ok_or_else(|| CoreError::not_found(format!("ask {id}")))
    }

    /// Add `user` to the ask's declines. Repeat declines change nothing.
    pub fn decline(&self, id: &AskId, user: &UserId) -> Result<Ask> {
        self.raw.atomic(|txn| {
            let mut ask = Self::load_in(txn, id)?;
            // Non-recipients cannot tell the ask exists.
            if !ask.is_recipient(user) {
                return Err(CoreError::not_found(format!("ask {id}")));
            }
            if ask.decline(user.clone()) {
                RawAsks::put_raw_in(txn, id.as_str(), &encode(&ask)?)?;
            }
            Ok(ask)
        })
    }

    pub fn add_response(&self, response: &AskResponse) -> Result<()> {
        self.raw.asks.put_response_raw(
            response.id.as_str(),
            response.ask_id.as_str(),
            &encode(response)?,
        )?;
        Ok(())
    }

    /// Responses to an ask, oldest first.
    pub fn list_responses(&self, id: &AskId) -> Result<Vec<AskResponse>> {
        let mut responses: Vec<AskResponse> = self
            .raw
            .asks
            .list_responses_raw(id.as_str())?
            .iter()
            .map(|(_, bytes)| decode(bytes))
            .collect::<Result<_>>()?;
        responses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(responses)
    }

    /// Fulfill a pending ask with a provider recommendation.
    ///
    /// The recommendation (reused by provider email when possible), the
    /// recipient's review and the ask update commit together or not at all.
    pub fn fulfill(
        &self,
        id: &AskId,
        recipient: &UserId,
        provider: ProviderDetails,
        review: ReviewDetails,
    ) -> Result<Fulfillment> {
        self.raw.atomic(|txn| {
            let mut ask = Self::load_in(txn, id)?;
            if !ask.is_recipient(recipient) {
                return Err(CoreError::forbidden("only recipients can fulfill an ask"));
            }
            if ask.is_fulfilled() {
                return Err(CoreError::AlreadyFulfilled);
            }

            let tags: BTreeSet<String> = match ask.query.as_deref() {
                Some(query) => normalize_tag(query)?.into_iter().collect(),
                None => BTreeSet::new(),
            };
            let recommendation_id =
                RecommendationStorage::find_or_create_in(txn, recipient, provider, tags)?;
            let review = RecommendationStorage::add_review_in(
                txn,
                &recommendation_id,
                recipient,
                review,
                Some(ask.id.clone()),
            )?;

            ask.mark_fulfilled(recommendation_id, recipient.clone());
            RawAsks::put_raw_in(txn, id.as_str(), &encode(&ask)?)?;
            Ok(Fulfillment { ask, review })
        })
    }

    /// Asks created by `asker`, newest first.
    pub fn list_outbound(&self, asker: &UserId) -> Result<Vec<Ask>> {
        let mut asks: Vec<Ask> = self
            .raw
            .asks
            .list_by_asker_raw(asker.as_str())?
            .iter()
            .map(|(_, bytes)| decode(bytes))
            .collect::<Result<_>>()?;
        asks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(asks)
    }

    /// Asks addressed to `recipient`, minus the ones they declined, newest
    /// first. Asks the recipient already answered report `responded`.
    pub fn list_inbound(&self, recipient: &UserId) -> Result<Vec<InboundAsk>> {
        let mut views = Vec::new();
        for (_, bytes) in self.raw.asks.list_by_recipient_raw(recipient.as_str())? {
            let ask: Ask = decode(&bytes)?;
            if ask.has_declined(recipient) {
                continue;
            }
            let responded = self
                .list_responses(&ask.id)?
                .iter()
                .any(|response| &response.responder == recipient);
            views.push(InboundAsk::from_ask(ask, responded));
        }
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    fn load_in(txn: &WriteTransaction, id: &AskId) -> Result<Ask> {
        let bytes = RawAsks::get_raw_in(txn, id.as_str())?
            .ok_or_else(|| CoreError::not_found(format!("ask {id}")))?;
        decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AskStatus, EffectiveAskStatus, RecommendationId};
    use crate::storage::test_support::{create_test_storage, create_user};
    use crate::storage::Storage;

    fn create_ask(storage: &Storage, asker: &UserId, recipients: &[&UserId]) -> Ask {
        let ask = Ask::new(
            asker.clone(),
            recipients.iter().map(|id| (*id).clone()).collect(),
            "Need a plumber".to_string(),
            "Leaky sink".to_string(),
            Some("plumber".to_string()),
        );
        storage.asks.create(&ask).unwrap();
        ask
    }

    fn provider() -> ProviderDetails {
        ProviderDetails {
            name: "Joe's Plumbing".to_string(),
            email: Some("joe@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_decline_hides_inbound_for_decliner_only() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        let r2 = create_user(&storage, "r2");
        let ask = create_ask(&storage, &asker, &[&r1, &r2]);

        let declined = storage.asks.decline(&ask.id, &r1).unwrap();
        assert_eq!(declined.status, AskStatus::Pending);
        storage.asks.decline(&ask.id, &r1).unwrap();
        assert_eq!(storage.asks.require(&ask.id).unwrap().declined_by.len(), 1);

        assert!(storage.asks.list_inbound(&r1).unwrap().is_empty());
        let inbound = storage.asks.list_inbound(&r2).unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].status, EffectiveAskStatus::Pending);
    }

    #[test]
    fn test_decline_by_non_recipient_is_not_found() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        let ask = create_ask(&storage, &asker, &[&r1]);

        assert!(matches!(
            storage.asks.decline(&ask.id, &asker),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            storage.asks.decline(&AskId::from("missing"), &r1),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_response_marks_inbound_as_responded() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        let r2 = create_user(&storage, "r2");
        let ask = create_ask(&storage, &asker, &[&r1, &r2]);

        storage
            .asks
            .add_response(&AskResponse::new(ask.id.clone(), r1.clone(), "Try Joe".to_string()))
            .unwrap();

        assert_eq!(
            storage.asks.list_inbound(&r1).unwrap()[0].status,
            EffectiveAskStatus::Responded
        );
        assert_eq!(
            storage.asks.list_inbound(&r2).unwrap()[0].status,
            EffectiveAskStatus::Pending
        );
        assert_eq!(storage.asks.require(&ask.id).unwrap().status, AskStatus::Pending);
    }

    #[test]
    fn test_fulfill_writes_recommendation_review_and_ask() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        let ask = create_ask(&storage, &asker, &[&r1]);

        let outcome = storage
            .asks
            .fulfill(&ask.id, &r1, provider(), ReviewDetails::default())
            .unwrap();
        assert_eq!(outcome.ask.status, AskStatus::Fulfilled);
        assert_eq!(outcome.ask.fulfilled_by.as_ref(), Some(&r1));

        let rec_id: RecommendationId = outcome.ask.recommendation_id.clone().unwrap();
        let rec = storage.recommendations.require(&rec_id).unwrap();
        assert_eq!(rec.owner, r1);
        assert!(rec.has_tag("plumber"));
        assert_eq!(outcome.review.ask_id.as_ref(), Some(&ask.id));
        assert_eq!(storage.recommendations.reviews_by(&r1).unwrap().len(), 1);

        assert!(matches!(
            storage
                .asks
                .fulfill(&ask.id, &r1, provider(), ReviewDetails::default()),
            Err(CoreError::AlreadyFulfilled)
        ));
        assert_eq!(storage.recommendations.reviews_by(&r1).unwrap().len(), 1);
    }

    #[test]
    fn test_fulfill_by_non_recipient_writes_nothing() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        let outsider = create_user(&storage, "outsider");
        let ask = create_ask(&storage, &asker, &[&r1]);

        assert!(matches!(
            storage
                .asks
                .fulfill(&ask.id, &outsider, provider(), ReviewDetails::default()),
            Err(CoreError::Forbidden(_))
        ));
        assert!(
            storage
                .recommendations
                .find_by_provider_email("joe@example.com")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_outbound_lists_by_asker() {
        let (storage, _tmp) = create_test_storage();
        let asker = create_user(&storage, "asker");
        let r1 = create_user(&storage, "r1");
        create_ask(&storage, &asker, &[&r1]);
        create_ask(&storage, &asker, &[&r1]);

        let outbound = storage.asks.list_outbound(&asker).unwrap();
        assert_eq!(outbound.len(), 2);
        assert!(outbound[0].created_at >= outbound[1].created_at);
        assert!(storage.asks.list_outbound(&r1).unwrap().is_empty());
    }
}
