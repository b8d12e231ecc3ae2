use std::sync::Arc;

use crate::data::recipe_repository::RecipeRepository;
use crate::domain::error::DomainError;
use crate::domain::ownership::ensure_owner;
use crate::domain::recipe::{NewRecipe, RecipeChanges, RecipeDetail};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct RecipeService {
    repo: Arc<dyn RecipeRepository>,
}

impl RecipeService {
    pub fn new(repo: Arc<dyn RecipeRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_recipes(&self, caller: Uuid) -> Result<Vec<RecipeDetail>, DomainError> {
        self.repo.list_for_owner(caller).await
    }

    pub async fn get_recipe(&self, caller: Uuid, id: i64) -> Result<RecipeDetail, DomainError> {
        let recipe = self.repo.find_by_id(id).await?;
        ensure_owner(caller, recipe, || DomainError::RecipeNotFound(id))
    }

    #[instrument(skip(self, recipe), fields(title = %recipe.title))]
    pub async fn create_recipe(
        &self,
        caller: Uuid,
        recipe: NewRecipe,
    ) -> Result<RecipeDetail, DomainError> {
        self.repo.create(caller, recipe).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update_recipe(
        &self,
        caller: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<RecipeDetail, DomainError> {
        self.get_recipe(caller, id).await?;
        self.repo
            .update(caller, id, changes)
            .await?
            .ok_or(DomainError::RecipeNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, caller: Uuid, id: i64) -> Result<(), DomainError> {
        self.get_recipe(caller, id).await?;
        if self.repo.delete(caller, id).await? {
            Ok(())
        } else {
            Err(DomainError::RecipeNotFound(id))
        }
    }
}
