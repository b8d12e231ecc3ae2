use crate::data::label_repository::{load_links, replace_links};
use crate::domain::error::DomainError;
use crate::domain::label::LabelKind;
use crate::domain::recipe::{NewRecipe, Recipe, RecipeChanges, RecipeDetail};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, description, link, created_at, updated_at";

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, owner: Uuid, recipe: NewRecipe) -> Result<RecipeDetail, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RecipeDetail>, DomainError>;
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<RecipeDetail>, DomainError>;
    async fn update(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<RecipeDetail>, DomainError>;
    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, DomainError>;
    async fn list_all(&self) -> Result<Vec<RecipeDetail>, DomainError>;
    async fn delete_any(&self, id: i64) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresRecipeRepository {
    pool: PgPool,
}

impl PostgresRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn with_labels(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeDetail>, sqlx::Error> {
    let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let mut tags = load_links(conn, LabelKind::Tag, &ids).await?;
    let mut ingredients = load_links(conn, LabelKind::Ingredient, &ids).await?;

    Ok(recipes
        .into_iter()
        .map(|recipe| RecipeDetail {
            tags: tags.remove(&recipe.id).unwrap_or_default(),
            ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}

#[async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    async fn create(&self, owner: Uuid, new: NewRecipe) -> Result<RecipeDetail, DomainError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, description, link, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(&new.title)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.link)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to create recipe: {}", e);
            DomainError::from(e)
        })?;

        let mut detail = RecipeDetail {
            recipe,
            tags: Vec::new(),
            ingredients: Vec::new(),
        };
        for kind in LabelKind::ALL {
            let recipe_id = detail.recipe.id;
            *detail.labels_mut(kind) =
                replace_links(&mut *tx, kind, recipe_id, owner, new.labels(kind)).await?;
        }

        tx.commit().await?;

        info!(
            recipe_id = detail.recipe.id,
            user_id = %owner,
            tags = detail.tags.len(),
            "recipe created"
        );
        Ok(detail)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RecipeDetail>, DomainError> {
        let mut conn = self.pool.acquire().await?;
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })?;

        match recipe {
            Some(recipe) => Ok(with_labels(&mut *conn, vec![recipe]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<RecipeDetail>, DomainError> {
        let mut conn = self.pool.acquire().await?;
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(owner)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("db error while fetching recipes of {}: {}", owner, e);
            DomainError::from(e)
        })?;

        Ok(with_labels(&mut *conn, recipes).await?)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<RecipeDetail>, DomainError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET
                title = COALESCE($1, title),
                time_minutes = COALESCE($2, time_minutes),
                price = COALESCE($3, price),
                description = COALESCE($4, description),
                link = COALESCE($5, link),
                updated_at = $6
            WHERE id = $7 AND user_id = $8
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(&changes.title)
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(&changes.description)
        .bind(&changes.link)
        .bind(now)
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to update recipe {}: {}", id, e);
            DomainError::from(e)
        })?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        for kind in LabelKind::ALL {
            if let Some(names) = changes.labels(kind) {
                replace_links(&mut *tx, kind, recipe.id, owner, names).await?;
            }
        }

        let detail = with_labels(&mut *tx, vec![recipe]).await?.pop();
        tx.commit().await?;

        info!(recipe_id = id, user_id = %owner, "recipe updated");
        Ok(detail)
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(recipe_id = id, user_id = %owner, "recipe deleted");
        }
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<RecipeDetail>, DomainError> {
        let mut conn = self.pool.acquire().await?;
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id DESC"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("db error while fetching all recipes: {}", e);
            DomainError::from(e)
        })?;

        Ok(with_labels(&mut *conn, recipes).await?)
    }

    async fn delete_any(&self, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(recipe_id = id, "recipe deleted by staff");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::label_repository::{LabelRepository, PostgresLabelRepository};
    use crate::data::user_repository::{PostgresUserRepository, UserRepository};
    use crate::domain::user::User;
    use rust_decimal::Decimal;

    async fn owner(pool: &PgPool, email: &str) -> Uuid {
        PostgresUserRepository::new(pool.clone())
            .create(User::new(email.into(), "Cook".into(), "hash".into()))
            .await
            .unwrap()
            .id
    }

    fn recipe(title: &str, tags: &[&str], ingredients: &[&str]) -> NewRecipe {
        NewRecipe {
            title: title.into(),
            time_minutes: 30,
            price: Decimal::new(560, 2),
            description: "Steps".into(),
            link: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ingredients: ingredients.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn second_recipe_reuses_existing_labels(pool: PgPool) {
        let me = owner(&pool, "me@example.com").await;
        let repo = PostgresRecipeRepository::new(pool.clone());

        let first = repo
            .create(me, recipe("Curry", &["Vegan", "Spicy"], &["Rice"]))
            .await
            .unwrap();
        let second = repo
            .create(me, recipe("Stew", &["Vegan"], &["Rice", "Beans"]))
            .await
            .unwrap();

        let vegan = |detail: &RecipeDetail| {
            detail
                .tags
                .iter()
                .find(|t| t.name == "Vegan")
                .map(|t| t.id)
        };
        assert_eq!(vegan(&first), vegan(&second));
        assert_eq!(first.recipe.price.to_string(), "5.60");

        let labels = PostgresLabelRepository::new(pool);
        assert_eq!(labels.list_all(LabelKind::Tag).await.unwrap().len(), 2);
        assert_eq!(labels.list_all(LabelKind::Ingredient).await.unwrap().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn update_is_owner_scoped_and_replaces_given_label_sets(pool: PgPool) {
        let me = owner(&pool, "me@example.com").await;
        let other = owner(&pool, "other@example.com").await;
        let repo = PostgresRecipeRepository::new(pool.clone());
        let created = repo
            .create(me, recipe("Curry", &["Vegan"], &["Rice"]))
            .await
            .unwrap();
        let id = created.recipe.id;

        let foreign = repo
            .update(
                other,
                id,
                RecipeChanges {
                    title: Some("Stolen".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(foreign.is_none());

        let updated = repo
            .update(
                me,
                id,
                RecipeChanges {
                    title: Some("Green Curry".into()),
                    tags: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.recipe.title, "Green Curry");
        assert_eq!(updated.recipe.description, "Steps");
        assert!(updated.tags.is_empty());
        assert_eq!(updated.ingredients.len(), 1);

        assert!(!repo.delete(other, id).await.unwrap());
        assert!(repo.delete(me, id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
