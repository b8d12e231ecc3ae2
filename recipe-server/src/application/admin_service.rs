use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::label_repository::LabelRepository;
use crate::data::recipe_repository::RecipeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::label::{Label, LabelKind};
use crate::domain::recipe::{RecipeChanges, RecipeDetail};
use crate::domain::user::{AccountChanges, NewAccount, User};
use crate::infrastructure::security::hash_password;

/// Unscoped data management for staff accounts.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    recipes: Arc<dyn RecipeRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        recipes: Arc<dyn RecipeRepository>,
        labels: Arc<dyn LabelRepository>,
    ) -> Self {
        Self {
            users,
            recipes,
            labels,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list().await
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn create_user(&self, account: NewAccount) -> Result<User, DomainError> {
        let hash = hash(&account.password)?;
        let user = User {
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            ..User::new(account.email, account.name, hash)
        };
        self.users.create(user).await
    }

    /// Applies `changes`; a `password` replaces the stored hash.
    #[instrument(skip(self, changes, password))]
    pub async fn update_user(
        &self,
        id: Uuid,
        mut changes: AccountChanges,
        password: Option<String>,
    ) -> Result<User, DomainError> {
        if let Some(password) = password {
            changes.password_hash = Some(hash(&password)?);
        }
        self.users
            .update_account(id, changes)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        if self.users.delete(id).await? {
            info!(user_id = %id, "user removed by staff");
            Ok(())
        } else {
            Err(DomainError::UserNotFound(id))
        }
    }

    pub async fn list_recipes(&self) -> Result<Vec<RecipeDetail>, DomainError> {
        self.recipes.list_all().await
    }

    /// Edits any recipe. Label names resolve against the recipe owner's labels.
    #[instrument(skip(self, changes))]
    pub async fn update_recipe(
        &self,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<RecipeDetail, DomainError> {
        let recipe = self
            .recipes
            .find_by_id(id)
            .await?
            .ok_or(DomainError::RecipeNotFound(id))?;
        self.recipes
            .update(recipe.recipe.user_id, id, changes)
            .await?
            .ok_or(DomainError::RecipeNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, id: i64) -> Result<(), DomainError> {
        if self.recipes.delete_any(id).await? {
            Ok(())
        } else {
            Err(DomainError::RecipeNotFound(id))
        }
    }

    pub async fn list_labels(&self, kind: LabelKind) -> Result<Vec<Label>, DomainError> {
        self.labels.list_all(kind).await
    }

    #[instrument(skip(self))]
    pub async fn rename_label(
        &self,
        kind: LabelKind,
        id: i64,
        name: String,
    ) -> Result<Label, DomainError> {
        let label = self
            .labels
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| kind.not_found(id))?;
        self.labels
            .rename(kind, label.user_id, id, name)
            .await?
            .ok_or_else(|| kind.not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_label(&self, kind: LabelKind, id: i64) -> Result<(), DomainError> {
        if self.labels.delete_any(kind, id).await? {
            Ok(())
        } else {
            Err(kind.not_found(id))
        }
    }
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))
}
