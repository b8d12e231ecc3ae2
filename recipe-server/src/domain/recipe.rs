use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::label::{Label, LabelKind};
use crate::domain::ownership::Owned;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe together with its resolved tags and ingredients.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<Label>,
    pub ingredients: Vec<Label>,
}

impl RecipeDetail {
    pub fn labels_mut(&mut self, kind: LabelKind) -> &mut Vec<Label> {
        match kind {
            LabelKind::Tag => &mut self.tags,
            LabelKind::Ingredient => &mut self.ingredients,
        }
    }
}

impl Owned for RecipeDetail {
    fn owner_id(&self) -> Uuid {
        self.recipe.user_id
    }
}

/// Validated input for a new recipe. The owner is never part of it.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Validated changes to an existing recipe. `None` leaves a field untouched;
/// `Some` label lists replace the whole association set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipeChanges {
    pub fn labels(&self, kind: LabelKind) -> Option<&[String]> {
        match kind {
            LabelKind::Tag => self.tags.as_deref(),
            LabelKind::Ingredient => self.ingredients.as_deref(),
        }
    }
}

impl NewRecipe {
    pub fn labels(&self, kind: LabelKind) -> &[String] {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Ingredient => &self.ingredients,
        }
    }
}

/// Trims names and drops repeats, keeping first-seen order.
pub fn dedup_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim().to_string();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
