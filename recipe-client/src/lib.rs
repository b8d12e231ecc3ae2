use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;
mod http_client;

pub use error::RecipeClientError;
pub use http_client::RecipeClientHttp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    /// Only present on detail responses.
    #[serde(default)]
    pub description: Option<String>,
    pub tags: Vec<Label>,
    pub ingredients: Vec<Label>,
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |labels: &[Label]| {
            labels
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "[{}] {}", self.id, self.title)?;
        writeln!(f, "  time: {} min, price: {}", self.time_minutes, self.price)?;
        if !self.link.is_empty() {
            writeln!(f, "  link: {}", self.link)?;
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(f, "  {}", description)?;
        }
        writeln!(f, "  tags: {}", names(&self.tags))?;
        write!(f, "  ingredients: {}", names(&self.ingredients))
    }
}

/// Fields sent on create and update. `None` fields are left out of the body,
/// so a partial update only touches what is set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Tag,
    Ingredient,
}

impl LabelKind {
    pub fn path(self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }
}

#[async_trait(?Send)]
pub trait RecipeClientTrait {
    async fn register(
        &mut self,
        email: String,
        password: String,
        name: String,
    ) -> Result<(), RecipeClientError>;
    async fn login(&mut self, email: String, password: String) -> Result<(), RecipeClientError>;
    async fn me(&mut self) -> Result<User, RecipeClientError>;
    async fn list_recipes(&mut self) -> Result<Vec<Recipe>, RecipeClientError>;
    async fn get_recipe(&mut self, id: i64) -> Result<Recipe, RecipeClientError>;
    async fn create_recipe(&mut self, input: RecipeInput) -> Result<Recipe, RecipeClientError>;
    /// `replace` sends a PUT, otherwise a PATCH.
    async fn update_recipe(
        &mut self,
        id: i64,
        input: RecipeInput,
        replace: bool,
    ) -> Result<Recipe, RecipeClientError>;
    async fn delete_recipe(&mut self, id: i64) -> Result<(), RecipeClientError>;
    async fn list_labels(
        &mut self,
        kind: LabelKind,
        assigned_only: bool,
    ) -> Result<Vec<Label>, RecipeClientError>;
    async fn rename_label(
        &mut self,
        kind: LabelKind,
        id: i64,
        name: String,
    ) -> Result<Label, RecipeClientError>;
    async fn delete_label(&mut self, kind: LabelKind, id: i64) -> Result<(), RecipeClientError>;
}
