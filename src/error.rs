use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub const GENERIC_FAILURE: &str = "Could not complete request";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // store detail stays in the logs
        let message = match &self {
            AppError::Store(e) => {
                error!("{e}");
                GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(AppError::MalformedPayload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);

        let corrupt = StoreError::Corrupt {
            id: "x".into(),
            reason: "y".into(),
        };
        assert_eq!(
            AppError::Store(corrupt).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_client_errors_carry_message() {
        let (status, json) = body(AppError::InvalidInput("message is required".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "message is required" }));
    }

    #[tokio::test]
    async fn test_store_errors_do_not_leak() {
        let corrupt = StoreError::Corrupt {
            id: "secret-id".into(),
            reason: "internal detail".into(),
        };
        let (status, json) = body(AppError::Store(corrupt)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": GENERIC_FAILURE }));
    }
}
