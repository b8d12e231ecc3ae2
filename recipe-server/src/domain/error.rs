use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("recipe not found: {0}")]
    RecipeNotFound(i64),
    #[error("tag not found: {0}")]
    TagNotFound(i64),
    #[error("ingredient not found: {0}")]
    IngredientNotFound(i64),
    #[error("not found: {0}")]
    RouteNotFound(String),
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::RecipeNotFound(_)
            | DomainError::TagNotFound(_)
            | DomainError::IngredientNotFound(_)
            | DomainError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs.
        let message = match self {
            DomainError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            DomainError::UserNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::RecipeNotFound(resource)
            | DomainError::TagNotFound(resource)
            | DomainError::IngredientNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::Validation(errors) => serde_json::to_value(errors).ok(),
            DomainError::Forbidden => {
                Some(json!({ "message": "staff privileges are required for this resource" }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
