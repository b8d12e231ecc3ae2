//! Shared fixtures for handler tests: an in-memory store behind the real
//! routing table and middleware stack.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{App, Error, test};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::data::label_repository::LabelRepository;
use crate::data::memory::MemoryStore;
use crate::data::recipe_repository::RecipeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::recipe::NewRecipe;
use crate::domain::user::User;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::presentation::routes::{self, Services};

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub keys: JwtKeys,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            keys: JwtKeys::new("test-secret".into(), 1),
        }
    }

    pub fn services(&self) -> Services {
        let users: Arc<dyn UserRepository> = self.store.clone();
        let recipes: Arc<dyn RecipeRepository> = self.store.clone();
        let labels: Arc<dyn LabelRepository> = self.store.clone();
        Services::new(users, recipes, labels, self.keys.clone())
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(NormalizePath::trim())
            .configure(routes::configure(self.services()))
    }

    pub fn user(&self, email: &str) -> User {
        self.store
            .insert_user(User::new(email.into(), "Test User".into(), "unused".into()))
    }

    pub fn staff(&self, email: &str) -> User {
        let mut user = User::new(email.into(), "Staff".into(), "unused".into());
        user.is_staff = true;
        self.store.insert_user(user)
    }

    pub fn token(&self, user: &User) -> String {
        self.keys.generate_token(user.id).unwrap()
    }

    fn authorized(&self, req: test::TestRequest, user: &User, uri: &str) -> test::TestRequest {
        req.uri(uri)
            .insert_header(("Authorization", format!("Bearer {}", self.token(user))))
    }

    pub fn get(&self, user: &User, uri: &str) -> test::TestRequest {
        self.authorized(test::TestRequest::get(), user, uri)
    }

    pub fn post(&self, user: &User, uri: &str) -> test::TestRequest {
        self.authorized(test::TestRequest::post(), user, uri)
    }

    pub fn put(&self, user: &User, uri: &str) -> test::TestRequest {
        self.authorized(test::TestRequest::put(), user, uri)
    }

    pub fn patch(&self, user: &User, uri: &str) -> test::TestRequest {
        self.authorized(test::TestRequest::patch(), user, uri)
    }

    pub fn delete(&self, user: &User, uri: &str) -> test::TestRequest {
        self.authorized(test::TestRequest::delete(), user, uri)
    }

    /// Seeds a recipe for `owner` through the repository write path.
    pub async fn recipe(&self, owner: &User, title: &str, tags: &[&str]) -> i64 {
        let new = NewRecipe {
            title: title.to_string(),
            time_minutes: 22,
            price: Decimal::new(525, 2),
            description: "Sample description".into(),
            link: "https://sample.com".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ingredients: Vec::new(),
        };
        RecipeRepository::create(&*self.store, owner.id, new)
            .await
            .unwrap()
            .recipe
            .id
    }
}

pub async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    test::read_body_json(resp).await
}
