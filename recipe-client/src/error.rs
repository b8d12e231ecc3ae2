use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Token storage error: {0}")]
    TokenStore(#[from] std::io::Error),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl RecipeClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        match resp.text().await {
            Ok(body) => Self::from_status(status, &body),
            Err(err) => RecipeClientError::RequestError(err),
        }
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) if status == StatusCode::BAD_REQUEST => format!("{error}: {details}"),
            Ok(parsed) => parsed.error,
            Err(_) => body.trim().to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => RecipeClientError::NotFound,
            StatusCode::UNAUTHORIZED => RecipeClientError::Unauthorized,
            StatusCode::FORBIDDEN => RecipeClientError::Forbidden,
            StatusCode::CONFLICT => RecipeClientError::Conflict(message),
            StatusCode::BAD_REQUEST => RecipeClientError::InvalidRequest(message),
            other => RecipeClientError::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_details_are_kept() {
        let err = RecipeClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"validation failed","details":{"title":["This field is required."]}}"#,
        );
        match err {
            RecipeClientError::InvalidRequest(message) => {
                assert!(message.starts_with("validation failed"));
                assert!(message.contains("title"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            RecipeClientError::from_status(StatusCode::NOT_FOUND, "{}"),
            RecipeClientError::NotFound
        ));
        assert!(matches!(
            RecipeClientError::from_status(StatusCode::UNAUTHORIZED, ""),
            RecipeClientError::Unauthorized
        ));
        match RecipeClientError::from_status(StatusCode::BAD_GATEWAY, "upstream down") {
            RecipeClientError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
