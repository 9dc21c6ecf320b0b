use crate::api::extract::ApiJson;
use crate::api::{ApiResult, ok, state::AppState};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use trustnet_core::{UserId, scoring::Suggestion, services};

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub asker: UserId,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub asker: UserId,
    pub recipient: UserId,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommenderEntry {
    pub id: UserId,
    pub name: String,
    pub score: u8,
    pub reason: String,
    pub has_profile_image: bool,
    pub degree: u8,
}

impl From<Suggestion> for RecommenderEntry {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            has_profile_image: suggestion.user.has_profile_image(),
            id: suggestion.user.id,
            name: suggestion.user.display_name,
            score: suggestion.score,
            reason: suggestion.reason,
            degree: suggestion.degree.as_number(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub recommenders: Vec<RecommenderEntry>,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
}

// POST /api/recommenders/suggest
pub async fn suggest(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SuggestRequest>,
) -> ApiResult<SuggestResponse> {
    let suggestions =
        services::recommenders::suggest(&state, &request.asker, &request.query).await?;
    ok(SuggestResponse {
        recommenders: suggestions.into_iter().map(RecommenderEntry::from).collect(),
        query: request.query,
    })
}

// POST /api/recommenders/score
pub async fn score(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ScoreRequest>,
) -> ApiResult<ScoreResponse> {
    let score = services::recommenders::score(
        &state,
        &request.asker,
        &request.recipient,
        &request.query,
    )
    .await?;
    ok(ScoreResponse { score })
}
