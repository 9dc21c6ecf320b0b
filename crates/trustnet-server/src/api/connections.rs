use crate::api::extract::ApiJson;
use crate::api::{ApiResponse, ApiResult, StatusResult, ok, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use trustnet_core::{UserId, services};

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub from: UserId,
    pub to: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResult {
    pub from: UserId,
    pub to: UserId,
    pub created: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub id: UserId,
    pub degree: u8,
}

// POST /api/connections
pub async fn connect(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ConnectRequest>,
) -> StatusResult<ConnectionResult> {
    let created = services::connections::connect(&state, &request.from, &request.to).await?;
    let result = ConnectionResult {
        from: request.from,
        to: request.to,
        created,
    };
    if created {
        Ok((StatusCode::CREATED, Json(ApiResponse::ok(result))))
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(result).with_message("Already connected")),
        ))
    }
}

// GET /api/users/{id}/network
pub async fn get_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<NetworkEntry>> {
    let network = services::connections::network(&state, &UserId::from(id)).await?;
    let mut entries: Vec<NetworkEntry> = network
        .into_iter()
        .map(|(id, degree)| NetworkEntry {
            id,
            degree: degree.as_number(),
        })
        .collect();
    entries.sort_by(|a, b| a.degree.cmp(&b.degree).then_with(|| a.id.cmp(&b.id)));
    ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{create_test_app, create_user};

    #[tokio::test]
    async fn test_connect_status_codes() {
        let (app, _tmp_dir) = create_test_app().await;
        let a = create_user(&app, "a").await;
        let b = create_user(&app, "b").await;

        let (status, body) = connect(
            State(app.clone()),
            ApiJson(ConnectRequest {
                from: a.clone(),
                to: b.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.0.data.unwrap().created);

        let (status, body) = connect(State(app.clone()), ApiJson(ConnectRequest { from: b, to: a }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0.message.as_deref(), Some("Already connected"));
    }

    #[tokio::test]
    async fn test_self_connect_is_rejected() {
        let (app, _tmp_dir) = create_test_app().await;
        let a = create_user(&app, "a").await;

        let err = connect(
            State(app),
            ApiJson(ConnectRequest {
                from: a.clone(),
                to: a,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_network_lists_first_degree_first() {
        let (app, _tmp_dir) = create_test_app().await;
        let a = create_user(&app, "a").await;
        let b = create_user(&app, "b").await;
        let c = create_user(&app, "c").await;
        services::connections::connect(&app, &a, &b).await.unwrap();
        services::connections::connect(&app, &b, &c).await.unwrap();

        let entries = get_network(State(app), Path(a.to_string()))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!((&entries[0].id, entries[0].degree), (&b, 1));
        assert_eq!((&entries[1].id, entries[1].degree), (&c, 2));
    }
}
