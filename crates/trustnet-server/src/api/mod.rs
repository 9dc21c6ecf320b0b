pub mod asks;
pub mod communities;
pub mod connections;
pub mod error;
pub mod extract;
pub mod recommendations;
pub mod recommenders;
pub mod response;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use response::ApiResponse;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use state::AppState;
use trustnet_core::UserId;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Handler result carrying an explicit status (201 on creation).
pub type StatusResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

pub fn created<T: Serialize>(data: T) -> StatusResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

/// Read a user id passed as a query parameter.
pub fn required_user(value: Option<String>, name: &str) -> Result<UserId, ApiError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(UserId::from)
        .ok_or_else(|| ApiError::bad_request(format!("missing query parameter '{name}'")))
}

#[derive(Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "trustnet is working!".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // User directory
        .route("/api/users/resolve", post(users::resolve_user))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/{id}/activity", post(users::record_activity))
        .route("/api/users/{id}/signals", post(users::update_signals))
        .route("/api/users/{id}/network", get(connections::get_network))
        // Connection graph
        .route("/api/connections", post(connections::connect))
        // Communities
        .route("/api/communities", post(communities::create_community))
        .route("/api/communities/{id}", get(communities::get_community))
        .route("/api/communities/{id}/join", post(communities::request_join))
        .route("/api/communities/{id}/approve", post(communities::approve_member))
        .route("/api/communities/{id}/members", get(communities::list_members))
        .route("/api/communities/{id}/pending", get(communities::list_pending))
        // Recommendations
        .route(
            "/api/recommendations",
            get(recommendations::list_visible).post(recommendations::create_recommendation),
        )
        .route(
            "/api/recommendations/{id}",
            get(recommendations::get_recommendation).put(recommendations::update_recommendation),
        )
        .route(
            "/api/recommendations/{id}/share",
            post(recommendations::share_recommendation),
        )
        .route(
            "/api/recommendations/{id}/reviews",
            get(recommendations::list_reviews),
        )
        // Recommender matching
        .route("/api/recommenders/suggest", post(recommenders::suggest))
        .route("/api/recommenders/score", post(recommenders::score))
        // Ask lifecycle
        .route("/api/asks", post(asks::create_ask))
        .route("/api/asks/bump", post(asks::bump_network))
        .route("/api/asks/inbound", get(asks::list_inbound))
        .route("/api/asks/outbound", get(asks::list_outbound))
        .route("/api/asks/{id}", get(asks::get_ask))
        .route("/api/asks/{id}/decline", post(asks::decline_ask))
        .route(
            "/api/asks/{id}/responses",
            get(asks::list_responses).post(asks::respond),
        )
        .route("/api/asks/{id}/fulfill", post(asks::fulfill_ask))
        .with_state(state)
}
