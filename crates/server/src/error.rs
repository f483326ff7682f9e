use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use launchpad_core::CoreError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    Validation(Vec<String>),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Database(db::DbError),
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl AppError {
    fn internal(detail: impl std::fmt::Debug) -> (StatusCode, &'static str, String) {
        tracing::error!("Internal error: {:?}", detail);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error".to_string(),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, error_type, message) = match self {
            AppError::Validation(errors) => {
                details = Some(errors);
                (
                    StatusCode::BAD_REQUEST,
                    "validation_failed",
                    "Validation failed".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::Internal(msg) => AppError::internal(msg),
            AppError::Database(err) => match err {
                db::DbError::DeploymentNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("Deployment not found: {}", id),
                ),
                db::DbError::ChainNameTaken(_) => (
                    StatusCode::CONFLICT,
                    "conflict",
                    format!("{}. Please choose a different chain name", err),
                ),
                db::DbError::InvalidTransition { .. } | db::DbError::ConcurrentUpdate(_) => {
                    (StatusCode::CONFLICT, "conflict", err.to_string())
                }
                other => AppError::internal(other),
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<db::DbError> for AppError {
    fn from(err: db::DbError) -> Self {
        AppError::Database(err)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeploymentNotFound(id) => {
                AppError::NotFound(format!("Deployment not found: {}", id))
            }
            CoreError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            other => AppError::Validation(other.details()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_bad_request() {
        let response =
            AppError::from(CoreError::Validation(vec!["Chain name is required".into()]))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_chain_name_taken_is_conflict() {
        let response =
            AppError::from(db::DbError::ChainNameTaken("taken".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_error_is_generic() {
        let response = AppError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
