use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest};
use actix_web::{HttpResponse, Responder, Scope, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth").service(register).service(login)
}

#[post("/register")]
async fn register(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, DomainError> {
    let registration = payload.into_inner().validate()?;
    let user = service
        .register(
            registration.email,
            registration.name,
            registration.password.clone(),
        )
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");

    let jwt = service.login(&user.email, &registration.password).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
    }))
}

#[post("/login")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, DomainError> {
    let jwt = service.login(&payload.email, &payload.password).await?;

    info!(email = %payload.email, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
    }))
}
