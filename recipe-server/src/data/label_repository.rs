use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::label::{Label, LabelKind};
use crate::domain::validation::ValidationErrors;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait LabelRepository: Send + Sync {
    async fn list_for_owner(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, DomainError>;
    async fn find_by_id(&self, kind: LabelKind, id: i64) -> Result<Option<Label>, DomainError>;
    async fn rename(
        &self,
        kind: LabelKind,
        owner: Uuid,
        id: i64,
        name: String,
    ) -> Result<Option<Label>, DomainError>;
    async fn delete(&self, kind: LabelKind, owner: Uuid, id: i64) -> Result<bool, DomainError>;
    async fn list_all(&self, kind: LabelKind) -> Result<Vec<Label>, DomainError>;
    async fn delete_any(&self, kind: LabelKind, id: i64) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresLabelRepository {
    pool: PgPool,
}

impl PostgresLabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn duplicate_name(kind: LabelKind) -> DomainError {
    let noun = match kind {
        LabelKind::Tag => "tag",
        LabelKind::Ingredient => "ingredient",
    };
    ValidationErrors::single("name", format!("A {noun} with this name already exists.")).into()
}

/// Insert-if-absent, else fetch. The no-op update makes `RETURNING` yield the
/// existing row when another writer got there first.
pub(crate) async fn get_or_create(
    conn: &mut PgConnection,
    kind: LabelKind,
    owner: Uuid,
    name: &str,
) -> Result<Label, sqlx::Error> {
    sqlx::query_as::<_, Label>(&format!(
        r#"
        INSERT INTO {table} (user_id, name)
        VALUES ($1, $2)
        ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, user_id, name
        "#,
        table = kind.table()
    ))
    .bind(owner)
    .bind(name)
    .fetch_one(&mut *conn)
    .await
}

/// Replaces the recipe's association set for `kind` with `names`.
pub(crate) async fn replace_links(
    conn: &mut PgConnection,
    kind: LabelKind,
    recipe_id: i64,
    owner: Uuid,
    names: &[String],
) -> Result<Vec<Label>, sqlx::Error> {
    sqlx::query(&format!(
        "DELETE FROM {link} WHERE recipe_id = $1",
        link = kind.link_table()
    ))
    .bind(recipe_id)
    .execute(&mut *conn)
    .await?;

    // Upserts lock label rows; a fixed order keeps concurrent writers of the
    // same owner from deadlocking on each other.
    let mut ordered: Vec<&str> = names.iter().map(String::as_str).collect();
    ordered.sort_unstable();
    ordered.dedup();

    let mut labels = Vec::with_capacity(ordered.len());
    for name in ordered {
        let label = get_or_create(conn, kind, owner, name).await?;
        sqlx::query(&format!(
            "INSERT INTO {link} (recipe_id, {column}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            link = kind.link_table(),
            column = kind.link_column()
        ))
        .bind(recipe_id)
        .bind(label.id)
        .execute(&mut *conn)
        .await?;
        labels.push(label);
    }

    labels.sort_by_key(|label| label.id);
    labels.dedup_by_key(|label| label.id);
    Ok(labels)
}

#[derive(sqlx::FromRow)]
struct LinkedLabel {
    recipe_id: i64,
    id: i64,
    user_id: Uuid,
    name: String,
}

/// Loads the labels of `kind` for each recipe id, ordered by label id.
pub(crate) async fn load_links(
    conn: &mut PgConnection,
    kind: LabelKind,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, Vec<Label>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<Label>> = HashMap::new();
    if recipe_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query_as::<_, LinkedLabel>(&format!(
        r#"
        SELECT l.recipe_id, t.id, t.user_id, t.name
        FROM {link} l
        JOIN {table} t ON t.id = l.{column}
        WHERE l.recipe_id = ANY($1)
        ORDER BY t.id
        "#,
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column()
    ))
    .bind(recipe_ids.to_vec())
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        grouped.entry(row.recipe_id).or_default().push(Label {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
        });
    }
    Ok(grouped)
}

#[async_trait]
impl LabelRepository for PostgresLabelRepository {
    async fn list_for_owner(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, DomainError> {
        let sql = if assigned_only {
            format!(
                r#"
                SELECT DISTINCT t.id, t.user_id, t.name
                FROM {table} t
                JOIN {link} l ON l.{column} = t.id
                JOIN recipes r ON r.id = l.recipe_id
                WHERE t.user_id = $1 AND r.user_id = $1
                ORDER BY t.name DESC, t.id DESC
                "#,
                table = kind.table(),
                link = kind.link_table(),
                column = kind.link_column()
            )
        } else {
            format!(
                r#"
                SELECT id, user_id, name
                FROM {table}
                WHERE user_id = $1
                ORDER BY name DESC, id DESC
                "#,
                table = kind.table()
            )
        };

        sqlx::query_as::<_, Label>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while listing {}: {}", kind.table(), e);
                DomainError::from(e)
            })
    }

    async fn find_by_id(&self, kind: LabelKind, id: i64) -> Result<Option<Label>, DomainError> {
        sqlx::query_as::<_, Label>(&format!(
            "SELECT id, user_id, name FROM {table} WHERE id = $1",
            table = kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {} in {}: {}", id, kind.table(), e);
            DomainError::from(e)
        })
    }

    async fn rename(
        &self,
        kind: LabelKind,
        owner: Uuid,
        id: i64,
        name: String,
    ) -> Result<Option<Label>, DomainError> {
        let label = sqlx::query_as::<_, Label>(&format!(
            r#"
            UPDATE {table}
            SET name = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, user_id, name
            "#,
            table = kind.table()
        ))
        .bind(&name)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .and_then(|db| db.constraint())
                .map(|c| c.ends_with("_user_id_name_key"))
                == Some(true)
            {
                duplicate_name(kind)
            } else {
                error!("failed to rename {} {}: {}", kind.table(), id, e);
                DomainError::from(e)
            }
        })?;

        if label.is_some() {
            info!(label_id = id, kind = kind.table(), name = %name, "label renamed");
        }
        Ok(label)
    }

    async fn delete(&self, kind: LabelKind, owner: Uuid, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query(&format!(
            "DELETE FROM {table} WHERE id = $1 AND user_id = $2",
            table = kind.table()
        ))
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(label_id = id, kind = kind.table(), "label deleted");
        }
        Ok(removed)
    }

    async fn list_all(&self, kind: LabelKind) -> Result<Vec<Label>, DomainError> {
        sqlx::query_as::<_, Label>(&format!(
            "SELECT id, user_id, name FROM {table} ORDER BY id",
            table = kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing all {}: {}", kind.table(), e);
            DomainError::from(e)
        })
    }

    async fn delete_any(&self, kind: LabelKind, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query(&format!(
            "DELETE FROM {table} WHERE id = $1",
            table = kind.table()
        ))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(label_id = id, kind = kind.table(), "label deleted by staff");
        }
        Ok(removed)
    }
}
