use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch exchange rate data")]
    ExchangeRate(#[source] anyhow::Error),
    // Crypto failures surface the upstream message to the client
    #[error("{0}")]
    Crypto(anyhow::Error),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, success) = match &self {
            ApiError::ExchangeRate(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            ApiError::Crypto(_) => (StatusCode::INTERNAL_SERVER_ERROR, Some(false)),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, Some(false)),
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
            success,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
