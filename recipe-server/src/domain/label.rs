use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ownership::Owned;

/// Tags and ingredients share one shape: a user-owned name linked to recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Tag,
    Ingredient,
}

impl LabelKind {
    pub const ALL: [LabelKind; 2] = [LabelKind::Tag, LabelKind::Ingredient];

    pub fn table(self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }

    pub fn link_table(self) -> &'static str {
        match self {
            LabelKind::Tag => "recipe_tags",
            LabelKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(self) -> &'static str {
        match self {
            LabelKind::Tag => "tag_id",
            LabelKind::Ingredient => "ingredient_id",
        }
    }

    pub fn not_found(self, id: i64) -> DomainError {
        match self {
            LabelKind::Tag => DomainError::TagNotFound(id),
            LabelKind::Ingredient => DomainError::IngredientNotFound(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
}

impl Owned for Label {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
