use crate::application::admin_service::AdminService;
use crate::domain::error::DomainError;
use crate::domain::label::LabelKind;
use crate::presentation::dto::{
    AdminCreateUserRequest, AdminLabelResponse, AdminRecipeResponse, AdminUpdateUserRequest,
    AdminUserResponse, RecipeRequest, RenameLabelRequest, WriteMode,
};
use crate::presentation::utils::StaffUser;
use actix_web::{HttpResponse, Scope, delete, get, patch, post, web};
use tracing::info;
use uuid::Uuid;

pub fn scope() -> Scope {
    web::scope("/admin")
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(list_recipes)
        .service(update_recipe)
        .service(delete_recipe)
        .service(list_tags)
        .service(rename_tag)
        .service(delete_tag)
        .service(list_ingredients)
        .service(rename_ingredient)
        .service(delete_ingredient)
}

#[get("/users")]
async fn list_users(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, DomainError> {
    let users = admin.list_users().await?;
    let body: Vec<AdminUserResponse> = users.into_iter().map(AdminUserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[post("/users")]
async fn create_user(
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: web::Json<AdminCreateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let account = payload.into_inner().validate()?;
    let user = admin.create_user(account).await?;

    info!(staff_id = %staff.0.id, user_id = %user.id, "user created by staff");

    Ok(HttpResponse::Created().json(AdminUserResponse::from(user)))
}

#[patch("/users/{id}")]
async fn update_user(
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: web::Json<AdminUpdateUserRequest>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let (changes, password) = payload.into_inner().validate()?;
    let user = admin
        .update_user(path.into_inner(), changes, password)
        .await?;

    info!(staff_id = %staff.0.id, user_id = %user.id, "user updated by staff");

    Ok(HttpResponse::Ok().json(AdminUserResponse::from(user)))
}

#[delete("/users/{id}")]
async fn delete_user(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    admin.delete_user(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/recipes")]
async fn list_recipes(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, DomainError> {
    let recipes = admin.list_recipes().await?;
    let body: Vec<AdminRecipeResponse> =
        recipes.into_iter().map(AdminRecipeResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[patch("/recipes/{id}")]
async fn update_recipe(
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: web::Json<RecipeRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.into_inner().validate(WriteMode::Partial)?;
    let recipe = admin.update_recipe(path.into_inner(), changes).await?;

    info!(staff_id = %staff.0.id, recipe_id = recipe.recipe.id, "recipe updated by staff");

    Ok(HttpResponse::Ok().json(AdminRecipeResponse::from(recipe)))
}

#[delete("/recipes/{id}")]
async fn delete_recipe(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    admin.delete_recipe(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list_labels(
    kind: LabelKind,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, DomainError> {
    let labels = admin.list_labels(kind).await?;
    let body: Vec<AdminLabelResponse> = labels.into_iter().map(AdminLabelResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn rename_label(
    kind: LabelKind,
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: RenameLabelRequest,
    id: i64,
) -> Result<HttpResponse, DomainError> {
    let name = payload.validate()?;
    let label = admin.rename_label(kind, id, name).await?;

    info!(
        staff_id = %staff.0.id,
        label_id = label.id,
        kind = kind.table(),
        "label renamed by staff"
    );

    Ok(HttpResponse::Ok().json(AdminLabelResponse::from(label)))
}

#[get("/tags")]
async fn list_tags(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, DomainError> {
    list_labels(LabelKind::Tag, admin).await
}

#[patch("/tags/{id}")]
async fn rename_tag(
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: web::Json<RenameLabelRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    rename_label(
        LabelKind::Tag,
        staff,
        admin,
        payload.into_inner(),
        path.into_inner(),
    )
    .await
}

#[delete("/tags/{id}")]
async fn delete_tag(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    admin.delete_label(LabelKind::Tag, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/ingredients")]
async fn list_ingredients(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
) -> Result<HttpResponse, DomainError> {
    list_labels(LabelKind::Ingredient, admin).await
}

#[patch("/ingredients/{id}")]
async fn rename_ingredient(
    staff: StaffUser,
    admin: web::Data<AdminService>,
    payload: web::Json<RenameLabelRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    rename_label(
        LabelKind::Ingredient,
        staff,
        admin,
        payload.into_inner(),
        path.into_inner(),
    )
    .await
}

#[delete("/ingredients/{id}")]
async fn delete_ingredient(
    _staff: StaffUser,
    admin: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    admin
        .delete_label(LabelKind::Ingredient, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
