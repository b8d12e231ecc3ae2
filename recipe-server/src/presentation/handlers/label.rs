use crate::application::label_service::LabelService;
use crate::domain::error::DomainError;
use crate::domain::label::LabelKind;
use crate::presentation::dto::{LabelListQuery, LabelResponse, RenameLabelRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, route, web};
use tracing::info;

async fn list(
    kind: LabelKind,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    query: web::Query<LabelListQuery>,
) -> Result<HttpResponse, DomainError> {
    let assigned_only = query.assigned_only()?;
    let found = labels.list_labels(kind, user.id, assigned_only).await?;
    let body: Vec<LabelResponse> = found.into_iter().map(LabelResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn rename(
    kind: LabelKind,
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    payload: web::Json<RenameLabelRequest>,
    id: i64,
) -> Result<HttpResponse, DomainError> {
    let name = payload.into_inner().validate()?;
    let label = labels.rename_label(kind, user.id, id, name).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        kind = kind.table(),
        label_id = id,
        "label renamed"
    );

    Ok(HttpResponse::Ok().json(LabelResponse::from(label)))
}

async fn remove(
    kind: LabelKind,
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    id: i64,
) -> Result<HttpResponse, DomainError> {
    labels.delete_label(kind, user.id, id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        kind = kind.table(),
        label_id = id,
        "label deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[get("/tags")]
async fn list_tags(
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    query: web::Query<LabelListQuery>,
) -> Result<HttpResponse, DomainError> {
    list(LabelKind::Tag, user, labels, query).await
}

#[route("/tags/{id}", method = "PUT", method = "PATCH")]
async fn rename_tag(
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    payload: web::Json<RenameLabelRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    rename(LabelKind::Tag, req, user, labels, payload, path.into_inner()).await
}

#[delete("/tags/{id}")]
async fn delete_tag(
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    remove(LabelKind::Tag, req, user, labels, path.into_inner()).await
}

#[get("/ingredients")]
async fn list_ingredients(
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    query: web::Query<LabelListQuery>,
) -> Result<HttpResponse, DomainError> {
    list(LabelKind::Ingredient, user, labels, query).await
}

#[route("/ingredients/{id}", method = "PUT", method = "PATCH")]
async fn rename_ingredient(
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    payload: web::Json<RenameLabelRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    rename(LabelKind::Ingredient, req, user, labels, payload, path.into_inner()).await
}

#[delete("/ingredients/{id}")]
async fn delete_ingredient(
    req: HttpRequest,
    user: AuthenticatedUser,
    labels: web::Data<LabelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    remove(LabelKind::Ingredient, req, user, labels, path.into_inner()).await
}
