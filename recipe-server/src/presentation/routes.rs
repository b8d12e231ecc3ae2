use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::label_service::LabelService;
use crate::application::recipe_service::RecipeService;
use crate::data::label_repository::LabelRepository;
use crate::data::recipe_repository::RecipeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers::{admin, auth, label, recipe, user};
use crate::presentation::middleware::JwtAuthMiddleware;
use crate::presentation::utils::{json_error_handler, path_error_handler, query_error_handler};

/// Application services shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub recipes: RecipeService,
    pub labels: LabelService,
    pub admin: AdminService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserRepository>,
        recipes: Arc<dyn RecipeRepository>,
        labels: Arc<dyn LabelRepository>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&users), keys),
            recipes: RecipeService::new(Arc::clone(&recipes)),
            labels: LabelService::new(Arc::clone(&labels)),
            admin: AdminService::new(users, recipes, labels),
        }
    }
}

/// Registers services, extractor configs and the `/api` routing table.
pub fn configure(services: Services) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(services.auth))
            .app_data(web::Data::new(services.recipes))
            .app_data(web::Data::new(services.labels))
            .app_data(web::Data::new(services.admin))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health))
                    .service(auth::scope())
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .service(user::get_me)
                            .service(user::update_me)
                            .service(recipe::list_recipes)
                            .service(recipe::create_recipe)
                            .service(recipe::get_recipe)
                            .service(recipe::replace_recipe)
                            .service(recipe::patch_recipe)
                            .service(recipe::delete_recipe)
                            .service(label::list_tags)
                            .service(label::rename_tag)
                            .service(label::delete_tag)
                            .service(label::list_ingredients)
                            .service(label::rename_ingredient)
                            .service(label::delete_ingredient)
                            .service(admin::scope())
                            .default_service(web::to(not_found)),
                    ),
            );
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, DomainError> {
    Err(DomainError::RouteNotFound(req.path().to_string()))
}
