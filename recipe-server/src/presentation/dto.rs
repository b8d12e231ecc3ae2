use crate::domain::label::Label;
use crate::domain::recipe::{NewRecipe, RecipeChanges, RecipeDetail, dedup_names};
use crate::domain::user::{AccountChanges, NewAccount, User};
use crate::domain::validation::{self, REQUIRED, ValidationErrors};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = required(&mut errors, "email", self.email)
            .and_then(|v| validation::email(&mut errors, "email", &v));
        let password = required(&mut errors, "password", self.password)
            .and_then(|v| validation::password(&mut errors, "password", &v));
        let name = required(&mut errors, "name", self.name)
            .and_then(|v| validation::text(&mut errors, "name", &v));

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) if errors.is_empty() => Ok(Registration {
                email,
                password,
                name,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

// ======================= USERS =======================

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<(Option<String>, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self
            .name
            .and_then(|v| validation::text(&mut errors, "name", &v));
        let password = self
            .password
            .and_then(|v| validation::password(&mut errors, "password", &v));
        errors.into_result((name, password))
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminCreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AdminCreateUserRequest {
    pub fn validate(self) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = required(&mut errors, "email", self.email)
            .and_then(|v| validation::email(&mut errors, "email", &v));
        let password = required(&mut errors, "password", self.password)
            .and_then(|v| validation::password(&mut errors, "password", &v));
        let name = match self.name {
            Some(v) => validation::optional_text(&mut errors, "name", &v),
            None => Some(String::new()),
        };

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) if errors.is_empty() => Ok(NewAccount {
                email,
                name,
                password,
                is_active: self.is_active.unwrap_or(true),
                is_staff: self.is_staff.unwrap_or(false),
                is_superuser: self.is_superuser.unwrap_or(false),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AdminUpdateUserRequest {
    /// Returns the changes and, separately, a new plain-text password.
    pub fn validate(self) -> Result<(AccountChanges, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self
            .email
            .and_then(|v| validation::email(&mut errors, "email", &v));
        let password = self
            .password
            .and_then(|v| validation::password(&mut errors, "password", &v));
        let name = self
            .name
            .and_then(|v| validation::optional_text(&mut errors, "name", &v));
        let changes = AccountChanges {
            email,
            name,
            password_hash: None,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        };
        errors.into_result((changes, password))
    }
}

// ======================= RECIPES =======================

/// Body of POST, PUT and PATCH on recipes. Every field arrives as raw JSON so
/// a value of the wrong type is reported against its field. Unknown keys
/// (including any attempt to set `user`) are ignored.
///
/// Tags and ingredients are lists of `"Vegan"` or `{"name": "Vegan"}`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    pub title: Option<Value>,
    pub time_minutes: Option<Value>,
    pub price: Option<Value>,
    pub description: Option<Value>,
    pub link: Option<Value>,
    pub tags: Option<Value>,
    pub ingredients: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST and PUT: title, time and price must be present.
    Full,
    /// PATCH: everything optional.
    Partial,
}

impl RecipeRequest {
    pub fn validate_new(self) -> Result<NewRecipe, ValidationErrors> {
        let changes = self.validate(WriteMode::Full)?;
        match (changes.title, changes.time_minutes, changes.price) {
            (Some(title), Some(time_minutes), Some(price)) => Ok(NewRecipe {
                title,
                time_minutes,
                price,
                description: changes.description.unwrap_or_default(),
                link: changes.link.unwrap_or_default(),
                tags: changes.tags.unwrap_or_default(),
                ingredients: changes.ingredients.unwrap_or_default(),
            }),
            _ => Err(ValidationErrors::single("non_field_errors", REQUIRED)),
        }
    }

    pub fn validate(self, mode: WriteMode) -> Result<RecipeChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full = mode == WriteMode::Full;

        let title = present(&mut errors, "title", self.title, full)
            .and_then(|v| string(&mut errors, "title", v))
            .and_then(|v| validation::text(&mut errors, "title", &v));
        let time_minutes = present(&mut errors, "time_minutes", self.time_minutes, full)
            .and_then(|v| integer(&mut errors, "time_minutes", &v))
            .and_then(|v| validation::minutes(&mut errors, "time_minutes", v));
        let price = present(&mut errors, "price", self.price, full)
            .and_then(|v| validation::price(&mut errors, "price", &v));
        let description = self
            .description
            .and_then(|v| string(&mut errors, "description", v))
            .map(|v| v.trim().to_string());
        let link = self
            .link
            .and_then(|v| string(&mut errors, "link", v))
            .and_then(|v| validation::optional_text(&mut errors, "link", &v));
        let tags = self
            .tags
            .and_then(|v| label_names(&mut errors, "tags", v));
        let ingredients = self
            .ingredients
            .and_then(|v| label_names(&mut errors, "ingredients", v));

        errors.into_result(RecipeChanges {
            title,
            time_minutes,
            price,
            description,
            link,
            tags,
            ingredients,
        })
    }
}

fn required<T>(errors: &mut ValidationErrors, field: &str, value: Option<T>) -> Option<T> {
    present(errors, field, value, true)
}

fn present<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<T>,
    required: bool,
) -> Option<T> {
    if value.is_none() && required {
        errors.add(field, REQUIRED);
    }
    value
}

fn string(errors: &mut ValidationErrors, field: &str, value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => {
            errors.add(field, "Not a valid string.");
            None
        }
    }
}

/// Whole numbers only; `30`, `30.0` and `"30"` all pass.
fn integer(errors: &mut ValidationErrors, field: &str, value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, "A valid integer is required.");
    }
    parsed
}

/// `None` (with an error recorded) unless `value` is a list whose items are
/// names or `{"name": ...}` objects.
fn label_names(errors: &mut ValidationErrors, field: &str, value: Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        errors.add(field, "Expected a list of items.");
        return None;
    };

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let name = match item {
            Value::String(name) => name,
            Value::Object(mut object) => match object.remove("name") {
                Some(Value::String(name)) => name,
                Some(_) => {
                    errors.add(field, "Not a valid string.");
                    continue;
                }
                None => {
                    errors.add(field, "Each item needs a name.");
                    continue;
                }
            },
            _ => {
                errors.add(field, "Not a valid string.");
                continue;
            }
        };
        if let Some(name) = validation::text(errors, field, &name) {
            names.push(name);
        }
    }
    Some(dedup_names(names))
}

#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub id: i64,
    pub name: String,
}

impl From<&Label> for LabelResponse {
    fn from(label: &Label) -> Self {
        Self {
            id: label.id,
            name: label.name.clone(),
        }
    }
}

impl From<Label> for LabelResponse {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<LabelResponse>,
    pub ingredients: Vec<LabelResponse>,
}

impl From<&RecipeDetail> for RecipeResponse {
    fn from(detail: &RecipeDetail) -> Self {
        let recipe = &detail.recipe;
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            tags: detail.tags.iter().map(LabelResponse::from).collect(),
            ingredients: detail.ingredients.iter().map(LabelResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub summary: RecipeResponse,
    pub description: String,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            summary: RecipeResponse::from(&detail),
            description: detail.recipe.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminRecipeResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub detail: RecipeDetailResponse,
}

impl From<RecipeDetail> for AdminRecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            user_id: detail.recipe.user_id,
            detail: RecipeDetailResponse::from(detail),
        }
    }
}

// ======================= TAGS / INGREDIENTS =======================

#[derive(Debug, Deserialize)]
pub struct LabelListQuery {
    pub assigned_only: Option<String>,
}

impl LabelListQuery {
    pub fn assigned_only(&self) -> Result<bool, ValidationErrors> {
        match self.assigned_only.as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(_) => Err(ValidationErrors::single(
                "assigned_only",
                "Must be 0 or 1.",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameLabelRequest {
    pub name: Option<Value>,
}

impl RenameLabelRequest {
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(&mut errors, "name", self.name)
            .and_then(|v| string(&mut errors, "name", v))
            .and_then(|v| validation::text(&mut errors, "name", &v));
        match name {
            Some(name) if errors.is_empty() => Ok(name),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminLabelResponse {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
}

impl From<Label> for AdminLabelResponse {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            user_id: label.user_id,
            name: label.name,
        }
    }
}
