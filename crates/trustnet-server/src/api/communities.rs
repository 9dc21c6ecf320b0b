use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::{ApiResult, StatusResult, created, ok, required_user, state::AppState};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use trustnet_core::{Community, CommunityId, CommunityMembership, UserId, services};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommunityRequest {
    pub owner: UserId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub user: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub approver: UserId,
    pub user: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub membership: CommunityMembership,
    pub new_connections: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor: Option<String>,
}

// POST /api/communities
pub async fn create_community(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCommunityRequest>,
) -> StatusResult<Community> {
    created(services::communities::create_community(&state, &request.owner, &request.name).await?)
}

// GET /api/communities/{id}
pub async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Community> {
    ok(services::communities::get_community(&state, &CommunityId::from(id)).await?)
}

// POST /api/communities/{id}/join
pub async fn request_join(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<JoinRequest>,
) -> StatusResult<CommunityMembership> {
    let membership =
        services::communities::request_join(&state, &CommunityId::from(id), &request.user).await?;
    created(membership)
}

// POST /api/communities/{id}/approve
pub async fn approve_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ApproveRequest>,
) -> ApiResult<ApprovalResponse> {
    let outcome = services::communities::approve_member(
        &state,
        &CommunityId::from(id),
        &request.user,
        &request.approver,
    )
    .await?;
    ok(ApprovalResponse {
        membership: outcome.membership,
        new_connections: outcome.new_connections,
    })
}

// GET /api/communities/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<CommunityMembership>> {
    ok(services::communities::list_members(&state, &CommunityId::from(id)).await?)
}

// GET /api/communities/{id}/pending?actor=
pub async fn list_pending(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ActorQuery>,
) -> ApiResult<Vec<CommunityMembership>> {
    let actor = required_user(query.actor, "actor")?;
    ok(services::communities::list_pending(&state, &CommunityId::from(id), &actor).await?)
}
