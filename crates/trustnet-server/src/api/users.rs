use crate::api::extract::ApiJson;
use crate::api::{ApiResult, ok, state::AppState};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use trustnet_core::{User, UserId, UserProfile, UserSignals, services};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveUserRequest {
    pub external_identity: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

// POST /api/users/resolve
pub async fn resolve_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ResolveUserRequest>,
) -> ApiResult<User> {
    let profile = UserProfile {
        display_name: request.display_name,
        profile_image: request.profile_image,
        state: request.state,
        location: request.location,
    };
    ok(services::users::resolve_user(&state, &request.external_identity, profile).await?)
}

// GET /api/users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    ok(services::users::get_user(&state, &UserId::from(id)).await?)
}

// POST /api/users/{id}/activity
pub async fn record_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    ok(services::users::record_activity(&state, &UserId::from(id)).await?)
}

// POST /api/users/{id}/signals
pub async fn update_signals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(signals): ApiJson<UserSignals>,
) -> ApiResult<User> {
    ok(services::users::update_signals(&state, &UserId::from(id), signals).await?)
}
