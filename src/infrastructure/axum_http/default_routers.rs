use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::infrastructure::axum_http::error_responses::ErrorResponse;

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Resource not found")),
    )
}
