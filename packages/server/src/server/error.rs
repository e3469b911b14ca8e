//! API error type mapped onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::AuthError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // A unique-constraint violation bubbling up from a model query is a
        // conflict (duplicate reference number, username, etc.), not a 500.
        // A value-too-long error (SQLSTATE 22001) means over-long client
        // input slipped past handler validation, so it maps to 400.
        if let ApiError::Internal(ref err) = self {
            if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
                if db_err.is_unique_violation() {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "duplicate value" })),
                    )
                        .into_response();
                }
                if db_err.code().as_deref() == Some("22001") {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "value too long" })),
                    )
                        .into_response();
                }
            }
        }

        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error handling request");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired | AuthError::InvalidToken => ApiError::Unauthorized,
            AuthError::InvalidCredentials => ApiError::Unauthorized,
            AuthError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            AuthError::AdminRequired => ApiError::Forbidden("administrator access required".into()),
            AuthError::DatabaseError(e) => ApiError::Internal(e.into()),
            AuthError::InternalError(e) => ApiError::Internal(e),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}
