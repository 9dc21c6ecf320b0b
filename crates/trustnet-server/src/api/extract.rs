//! Request extractors whose rejections use the `ApiResponse` envelope.

use super::ApiError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query},
};

/// JSON body extractor. Malformed or incomplete bodies become a 400 `ApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor with the same rejection mapping as [`ApiJson`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
