use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::{ApiResult, StatusResult, created, ok, required_user, state::AppState};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use trustnet_core::services::recommendations::{NewRecommendation, RecommendationUpdate};
use trustnet_core::{
    CommunityId, Recommendation, RecommendationId, Review, UserId, Visibility, services,
};

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecommendationRequest {
    pub actor: UserId,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareRequest {
    pub actor: UserId,
    pub community: CommunityId,
}

// GET /api/recommendations?viewer=
pub async fn list_visible(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewerQuery>,
) -> ApiResult<Vec<Recommendation>> {
    let viewer = required_user(query.viewer, "viewer")?;
    ok(services::recommendations::list_visible(&state, &viewer).await?)
}

// POST /api/recommendations
pub async fn create_recommendation(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewRecommendation>,
) -> StatusResult<Recommendation> {
    created(services::recommendations::create_recommendation(&state, request).await?)
}

// GET /api/recommendations/{id}?viewer=
pub async fn get_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ViewerQuery>,
) -> ApiResult<Recommendation> {
    let viewer = required_user(query.viewer, "viewer")?;
    ok(
        services::recommendations::get_recommendation(
            &state,
            &RecommendationId::from(id),
            &viewer,
        )
        .await?,
    )
}

// PUT /api/recommendations/{id}
pub async fn update_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateRecommendationRequest>,
) -> ApiResult<Recommendation> {
    let update = RecommendationUpdate {
        visibility: request.visibility,
        tags: request.tags,
    };
    ok(services::recommendations::update_recommendation(
        &state,
        &RecommendationId::from(id),
        &request.actor,
        update,
    )
    .await?)
}

// POST /api/recommendations/{id}/share
pub async fn share_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ShareRequest>,
) -> ApiResult<Recommendation> {
    ok(services::recommendations::share_recommendation(
        &state,
        &RecommendationId::from(id),
        &request.actor,
        &request.community,
    )
    .await?)
}

// GET /api/recommendations/{id}/reviews?viewer=
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ViewerQuery>,
) -> ApiResult<Vec<Review>> {
    let viewer = required_user(query.viewer, "viewer")?;
    ok(services::recommendations::list_reviews(&state, &RecommendationId::from(id), &viewer).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{create_test_app, create_user};
    use axum::http::StatusCode;
    use trustnet_core::ProviderDetails;

    fn plumber(owner: &UserId, visibility: Visibility) -> NewRecommendation {
        NewRecommendation {
            owner: owner.clone(),
            provider: ProviderDetails {
                name: "Pat's Plumbing".to_string(),
                email: Some("Pat@Example.com".to_string()),
                ..Default::default()
            },
            tags: vec!["Plumber".to_string()],
            visibility,
            communities: Vec::new(),
        }
    }

    fn viewer(user: &UserId) -> ApiQuery<ViewerQuery> {
        ApiQuery(ViewerQuery {
            viewer: Some(user.to_string()),
        })
    }

    #[tokio::test]
    async fn test_private_recommendation_hidden_from_others() {
        let (app, _tmp_dir) = create_test_app().await;
        let owner = create_user(&app, "owner").await;
        let other = create_user(&app, "other").await;

        let (status, body) = create_recommendation(
            State(app.clone()),
            ApiJson(plumber(&owner, Visibility::Private)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let rec = body.0.data.unwrap();
        assert!(rec.has_tag("plumber"));

        let found = get_recommendation(State(app.clone()), Path(rec.id.to_string()), viewer(&owner))
            .await
            .unwrap();
        assert_eq!(found.0.data.unwrap().id, rec.id);

        let err = get_recommendation(State(app.clone()), Path(rec.id.to_string()), viewer(&other))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let listed = list_visible(State(app), viewer(&other))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_only_owner_may_update() {
        let (app, _tmp_dir) = create_test_app().await;
        let owner = create_user(&app, "owner").await;
        let other = create_user(&app, "other").await;
        let rec = services::recommendations::create_recommendation(
            &app,
            plumber(&owner, Visibility::Private),
        )
        .await
        .unwrap();

        let err = update_recommendation(
            State(app.clone()),
            Path(rec.id.to_string()),
            ApiJson(UpdateRecommendationRequest {
                actor: other.clone(),
                visibility: Some(Visibility::Public),
                tags: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let updated = update_recommendation(
            State(app.clone()),
            Path(rec.id.to_string()),
            ApiJson(UpdateRecommendationRequest {
                actor: owner,
                visibility: Some(Visibility::Public),
                tags: None,
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();
        assert_eq!(updated.visibility, Visibility::Public);

        let reviews = list_reviews(State(app), Path(rec.id.to_string()), viewer(&other))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_list_requires_viewer() {
        let (app, _tmp_dir) = create_test_app().await;

        let err = list_visible(State(app), ApiQuery(ViewerQuery { viewer: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
