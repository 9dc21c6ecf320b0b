use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::{ApiResult, StatusResult, created, ok, required_user, state::AppState};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use trustnet_core::services::asks::NewAsk;
use trustnet_core::{
    Ask, AskId, AskResponse, InboundAsk, ProviderDetails, Review, ReviewDetails, UserId, services,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct BumpRequest {
    pub asker: UserId,
    pub query: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeclineRequest {
    pub user: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RespondRequest {
    pub user: UserId,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequest {
    pub recipient: UserId,
    pub provider_details: ProviderDetails,
    #[serde(default)]
    pub review_details: ReviewDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FulfillResponse {
    pub ask: Ask,
    pub review: Review,
}

#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub actor: Option<String>,
    pub asker: Option<String>,
    pub recipient: Option<String>,
}

// POST /api/asks
pub async fn create_ask(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewAsk>,
) -> StatusResult<Ask> {
    created(services::asks::create_ask(&state, request).await?)
}

// POST /api/asks/bump
pub async fn bump_network(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BumpRequest>,
) -> StatusResult<Ask> {
    let ask = services::asks::bump_network(
        &state,
        &request.asker,
        &request.query,
        &request.title,
        &request.description,
    )
    .await?;
    created(ask)
}

// GET /api/asks/inbound?recipient=
pub async fn list_inbound(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AskQuery>,
) -> ApiResult<Vec<InboundAsk>> {
    let recipient = required_user(query.recipient, "recipient")?;
    ok(services::asks::list_inbound(&state, &recipient).await?)
}

// GET /api/asks/outbound?asker=
pub async fn list_outbound(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AskQuery>,
) -> ApiResult<Vec<Ask>> {
    let asker = required_user(query.asker, "asker")?;
    ok(services::asks::list_outbound(&state, &asker).await?)
}

// GET /api/asks/{id}?actor=
pub async fn get_ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<AskQuery>,
) -> ApiResult<Ask> {
    let actor = required_user(query.actor, "actor")?;
    ok(services::asks::get_ask(&state, &AskId::from(id), &actor).await?)
}

// POST /api/asks/{id}/decline
pub async fn decline_ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<DeclineRequest>,
) -> ApiResult<Ask> {
    ok(services::asks::decline_ask(&state, &AskId::from(id), &request.user).await?)
}

// GET /api/asks/{id}/responses?actor=
pub async fn list_responses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<AskQuery>,
) -> ApiResult<Vec<AskResponse>> {
    let actor = required_user(query.actor, "actor")?;
    ok(services::asks::list_responses(&state, &AskId::from(id), &actor).await?)
}

// POST /api/asks/{id}/responses
pub async fn respond(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RespondRequest>,
) -> StatusResult<AskResponse> {
    created(services::asks::respond(&state, &AskId::from(id), &request.user, &request.text).await?)
}

// POST /api/asks/{id}/fulfill
pub async fn fulfill_ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<FulfillRequest>,
) -> StatusResult<FulfillResponse> {
    let fulfillment = services::asks::fulfill_ask(
        &state,
        &AskId::from(id),
        &request.recipient,
        request.provider_details,
        request.review_details,
    )
    .await?;
    created(FulfillResponse {
        ask: fulfillment.ask,
        review: fulfillment.review,
    })
}
