use crate::application::recipe_service::RecipeService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{RecipeDetailResponse, RecipeRequest, RecipeResponse, WriteMode};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use tracing::info;

#[get("/recipes")]
async fn list_recipes(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
) -> Result<HttpResponse, DomainError> {
    let list = recipes.list_recipes(user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        count = list.len(),
        "recipes retrieved"
    );

    let body: Vec<RecipeResponse> = list.iter().map(RecipeResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[post("/recipes")]
async fn create_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    payload: web::Json<RecipeRequest>,
) -> Result<HttpResponse, DomainError> {
    let new = payload.into_inner().validate_new()?;
    let recipe = recipes.create_recipe(user.id, new).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        recipe_id = recipe.recipe.id,
        "recipe created"
    );

    Ok(HttpResponse::Created().json(RecipeDetailResponse::from(recipe)))
}

#[get("/recipes/{id}")]
async fn get_recipe(
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let recipe = recipes.get_recipe(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RecipeDetailResponse::from(recipe)))
}

#[put("/recipes/{id}")]
async fn replace_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    payload: web::Json<RecipeRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    write(req, user, recipes, payload.into_inner(), path.into_inner(), WriteMode::Full).await
}

#[patch("/recipes/{id}")]
async fn patch_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    payload: web::Json<RecipeRequest>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    write(req, user, recipes, payload.into_inner(), path.into_inner(), WriteMode::Partial).await
}

async fn write(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    payload: RecipeRequest,
    recipe_id: i64,
    mode: WriteMode,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.validate(mode)?;
    let recipe = recipes.update_recipe(user.id, recipe_id, changes).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        recipe_id,
        partial = mode == WriteMode::Partial,
        "recipe updated"
    );

    Ok(HttpResponse::Ok().json(RecipeDetailResponse::from(recipe)))
}

#[delete("/recipes/{id}")]
async fn delete_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let recipe_id = path.into_inner();
    recipes.delete_recipe(user.id, recipe_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        recipe_id,
        "recipe deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
