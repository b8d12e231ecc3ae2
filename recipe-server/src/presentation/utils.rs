use actix_web::dev::Payload;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::domain::validation::ValidationErrors;
use crate::presentation::middleware::RequestId;

/// The caller resolved by `JwtAuthMiddleware`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub is_staff: bool,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_staff: user.is_staff,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(DomainError::Unauthorized.into())),
        }
    }
}

/// An authenticated caller holding the staff flag.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthenticatedUser);

impl FromRequest for StaffUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthenticatedUser>() {
            Some(user) if user.is_staff => Ok(StaffUser(user.clone())),
            Some(_) => Err(DomainError::Forbidden.into()),
            None => Err(DomainError::Unauthorized.into()),
        };
        ready(result)
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    DomainError::from(ValidationErrors::single("non_field_errors", err.to_string())).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    DomainError::from(ValidationErrors::single("query", err.to_string())).into()
}

/// Ids that do not parse name no resource at all.
pub fn path_error_handler(_err: PathError, req: &HttpRequest) -> Error {
    DomainError::RouteNotFound(req.path().to_string()).into()
}
