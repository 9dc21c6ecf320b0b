//! Ask lifecycle service
//!
//! An ask starts `pending` and becomes `fulfilled` when one recipient
//! submits a provider. Declines and freeform responses never change the
//! ask's own status.

use super::recommenders;
use crate::AppCore;
use crate::error::{CoreError, Result};
use crate::models::{
    Ask, AskId, AskResponse, InboundAsk, ProviderDetails, ReviewDetails, UserId, normalize_tag,
};
use crate::storage::asks::Fulfillment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsk {
    pub asker: UserId,
    pub recipients: Vec<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn create_ask(core: &Arc<AppCore>, input: NewAsk) -> Result<Ask> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(CoreError::validation("ask title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::validation(format!(
            "ask title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    core.storage.users.require(&input.asker)?;

    let recipients: BTreeSet<UserId> = input.recipients.into_iter().collect();
    if recipients.is_empty() {
        return Err(CoreError::validation("an ask needs at least one recipient"));
    }
    if recipients.contains(&input.asker) {
        return Err(CoreError::validation("an ask cannot be sent to its asker"));
    }
    for recipient in &recipients {
        core.storage.users.require(recipient)?;
    }
    let query = match input.query.as_deref() {
        Some(query) => normalize_tag(query)?,
        None => None,
    };

    let ask = Ask::new(
        input.asker,
        recipients,
        title,
        input.description.trim().to_string(),
        query,
    );
    core.storage.asks.create(&ask)?;

    info!(
        ask_id = %ask.id,
        asker = %ask.asker,
        recipients = ask.recipients.len(),
        "Created ask"
    );
    Ok(ask)
}

/// Send an ask to the best-scoring recommenders in the asker's network.
pub async fn bump_network(
    core: &Arc<AppCore>,
    asker: &UserId,
    query: &str,
    title: &str,
    description: &str,
) -> Result<Ask> {
    let suggestions = recommenders::suggest(core, asker, query).await?;
    if suggestions.is_empty() {
        return Err(CoreError::validation("no one in your network to ask yet"));
    }

    create_ask(
        core,
        NewAsk {
            asker: asker.clone(),
            recipients: suggestions.into_iter().map(|s| s.user.id).collect(),
            title: title.to_string(),
            description: description.to_string(),
            query: Some(query.to_string()),
        },
    )
    .await
}

/// Load an ask for its asker or one of its recipients.
pub async fn get_ask(core: &Arc<AppCore>, id: &AskId, actor: &UserId) -> Result<Ask> {
    let ask = core.storage.asks.require(id)?;
    if !ask.is_participant(actor) {
        return Err(CoreError::forbidden("not a participant of this ask"));
    }
    Ok(ask)
}

pub async fn decline_ask(core: &Arc<AppCore>, id: &AskId, user: &UserId) -> Result<Ask> {
    let ask = core.storage.asks.decline(id, user)?;
    info!(ask_id = %id, %user, "Ask declined");
    Ok(ask)
}

/// Append a freeform response from a recipient.
pub async fn respond(
    core: &Arc<AppCore>,
    id: &AskId,
    user: &UserId,
    text: &str,
) -> Result<AskResponse> {
    let ask = core.storage.asks.require(id)?;
    if !ask.is_recipient(user) {
        return Err(CoreError::forbidden("only recipients can respond to an ask"));
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(CoreError::validation("response text is required"));
    }

    let response = AskResponse::new(ask.id, user.clone(), text.to_string());
    core.storage.asks.add_response(&response)?;
    info!(ask_id = %id, %user, "Ask response recorded");
    Ok(response)
}

/// Fulfill an ask with a provider and the recipient's review of it.
pub async fn fulfill_ask(
    core: &Arc<AppCore>,
    id: &AskId,
    recipient: &UserId,
    mut provider: ProviderDetails,
    review: ReviewDetails,
) -> Result<Fulfillment> {
    provider.name = provider.name.trim().to_string();
    if provider.name.is_empty() {
        return Err(CoreError::validation("provider name is required"));
    }
    provider.email = provider.normalized_email();
    if let Some(rating) = review.rating
        && !(1..=5).contains(&rating)
    {
        return Err(CoreError::validation("rating must be between 1 and 5"));
    }

    match core.storage.asks.fulfill(id, recipient, provider, review) {
        Ok(fulfillment) => {
            info!(
                ask_id = %id,
                %recipient,
                recommendation_id = ?fulfillment.ask.recommendation_id,
                "Ask fulfilled"
            );
            Ok(fulfillment)
        }
        Err(CoreError::AlreadyFulfilled) => {
            warn!(ask_id = %id, %recipient, "Rejected second fulfillment");
            Err(CoreError::AlreadyFulfilled)
        }
        Err(err) => Err(err),
    }
}

/// Asks addressed to `recipient`, newest first, without the declined ones.
pub async fn list_inbound(core: &Arc<AppCore>, recipient: &UserId) -> Result<Vec<InboundAsk>> {
    core.storage.asks.list_inbound(recipient)
}

pub async fn list_outbound(core: &Arc<AppCore>, asker: &UserId) -> Result<Vec<Ask>> {
    core.storage.asks.list_outbound(asker)
}

/// The asker sees every response; a recipient sees only their own.
pub async fn list_responses(
    core: &Arc<AppCore>,
    id: &AskId,
    actor: &UserId,
) -> Result<Vec<AskResponse>> {
    let ask = get_ask(core, id, actor).await?;
    let responses = core.storage.asks.list_responses(id)?;
    if &ask.asker == actor {
        return Ok(responses);
    }
    Ok(responses
        .into_iter()
        .filter(|response| &response.responder == actor)
        .collect())
}
