use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{UpdateProfileRequest, UserResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, get, patch, web};
use tracing::info;

#[get("/users/me")]
async fn get_me(
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, DomainError> {
    let profile = service.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(profile)))
}

#[patch("/users/me")]
async fn update_me(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, DomainError> {
    let (name, password) = payload.into_inner().validate()?;
    let password_changed = password.is_some();
    let profile = service.update_profile(user.id, name, password).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        password_changed,
        "profile updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(profile)))
}
