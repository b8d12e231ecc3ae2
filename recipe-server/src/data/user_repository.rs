use crate::domain::error::DomainError;
use crate::domain::user::{AccountChanges, ProfileChanges, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, is_active, is_staff, is_superuser, created_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError>;
    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<User>, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_email_conflict(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map(|c| c.contains("users_email"))
        == Some(true)
}

pub(crate) fn email_taken() -> DomainError {
    DomainError::UserAlreadyExists("email already registered".to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, is_active, is_staff, is_superuser, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_email_conflict(&e) {
                email_taken()
            } else {
                error!("failed to create user: {}", e);
                DomainError::from(e)
            }
        })?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by email {}: {}", email, e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find user by id {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash)
            WHERE id = $3
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update user {}: {}", id, e);
            DomainError::from(e)
        })?;

        if user.is_some() {
            info!(user_id = %id, "user profile updated");
        }
        Ok(user)
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<User>, DomainError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                email = COALESCE($1, email),
                name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                is_active = COALESCE($4, is_active),
                is_staff = COALESCE($5, is_staff),
                is_superuser = COALESCE($6, is_superuser)
            WHERE id = $7
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(changes.email)
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(changes.is_active)
        .bind(changes.is_staff)
        .bind(changes.is_superuser)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_email_conflict(&e) {
                email_taken()
            } else {
                error!("failed to update account of user {}: {}", id, e);
                DomainError::from(e)
            }
        })?;

        if let Some(user) = &user {
            info!(
                user_id = %id,
                is_active = user.is_active,
                is_staff = user.is_staff,
                is_superuser = user.is_superuser,
                "user account updated"
            );
        }
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, email"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing users: {}", e);
            DomainError::from(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = %id, "user deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::label_repository::{LabelRepository, PostgresLabelRepository};
    use crate::data::recipe_repository::{PostgresRecipeRepository, RecipeRepository};
    use crate::domain::label::LabelKind;
    use crate::domain::recipe::NewRecipe;
    use rust_decimal::Decimal;

    fn user(email: &str) -> User {
        User::new(email.into(), "Cook".into(), "hash".into())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn duplicate_emails_are_conflicts(pool: PgPool) {
        let repo = PostgresUserRepository::new(pool);
        let first = repo.create(user("one@example.com")).await.unwrap();
        repo.create(user("two@example.com")).await.unwrap();

        assert!(matches!(
            repo.create(user("one@example.com")).await,
            Err(DomainError::UserAlreadyExists(_))
        ));
        assert!(matches!(
            repo.update_account(
                first.id,
                AccountChanges {
                    email: Some("two@example.com".into()),
                    ..Default::default()
                },
            )
            .await,
            Err(DomainError::UserAlreadyExists(_))
        ));

        let moved = repo
            .update_account(
                first.id,
                AccountChanges {
                    email: Some("three@example.com".into()),
                    password_hash: Some("new-hash".into()),
                    is_staff: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.email, "three@example.com");
        assert_eq!(moved.password_hash, "new-hash");
        assert!(moved.is_staff && moved.is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn deleting_a_user_cascades_to_recipes_and_labels(pool: PgPool) {
        let users = PostgresUserRepository::new(pool.clone());
        let gone = users.create(user("gone@example.com")).await.unwrap();
        let kept = users.create(user("kept@example.com")).await.unwrap();

        let recipes = PostgresRecipeRepository::new(pool.clone());
        for owner in [gone.id, kept.id] {
            recipes
                .create(
                    owner,
                    NewRecipe {
                        title: "Soup".into(),
                        time_minutes: 20,
                        price: Decimal::new(300, 2),
                        description: String::new(),
                        link: String::new(),
                        tags: vec!["Warm".into()],
                        ingredients: vec!["Water".into()],
                    },
                )
                .await
                .unwrap();
        }

        assert!(users.delete(gone.id).await.unwrap());
        assert!(!users.delete(gone.id).await.unwrap());

        let left = recipes.list_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].recipe.user_id, kept.id);

        let labels = PostgresLabelRepository::new(pool);
        for kind in LabelKind::ALL {
            let all = labels.list_all(kind).await.unwrap();
            assert_eq!(all.len(), 1);
            assert_eq!(all[0].user_id, kept.id);
        }
    }
}
