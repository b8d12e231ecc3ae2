//! In-process store backing the handler tests. Mirrors the SQL semantics of
//! the Postgres repositories: owner predicates, unique (user, name) labels,
//! cascading link removal and the same orderings.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::data::label_repository::{LabelRepository, duplicate_name};
use crate::data::recipe_repository::RecipeRepository;
use crate::data::user_repository::{UserRepository, email_taken};
use crate::domain::error::DomainError;
use crate::domain::label::{Label, LabelKind};
use crate::domain::recipe::{NewRecipe, Recipe, RecipeChanges, RecipeDetail};
use crate::domain::user::{AccountChanges, ProfileChanges, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    recipes: Vec<Recipe>,
    labels: HashMap<LabelKind, Vec<Label>>,
    links: HashMap<LabelKind, BTreeSet<(i64, i64)>>,
    next_id: i64,
    store_calls: usize,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn labels(&mut self, kind: LabelKind) -> &mut Vec<Label> {
        self.labels.entry(kind).or_default()
    }

    fn links(&mut self, kind: LabelKind) -> &mut BTreeSet<(i64, i64)> {
        self.links.entry(kind).or_default()
    }

    fn get_or_create(&mut self, kind: LabelKind, owner: Uuid, name: &str) -> Label {
        if let Some(existing) = self
            .labels(kind)
            .iter()
            .find(|l| l.user_id == owner && l.name == name)
        {
            return existing.clone();
        }
        let label = Label {
            id: self.next_id(),
            user_id: owner,
            name: name.to_string(),
        };
        self.labels(kind).push(label.clone());
        label
    }

    fn replace_links(&mut self, kind: LabelKind, recipe_id: i64, owner: Uuid, names: &[String]) {
        self.links(kind).retain(|(rid, _)| *rid != recipe_id);
        for name in names {
            let label = self.get_or_create(kind, owner, name);
            self.links(kind).insert((recipe_id, label.id));
        }
    }

    fn linked(&self, kind: LabelKind, recipe_id: i64) -> Vec<Label> {
        let Some(links) = self.links.get(&kind) else {
            return Vec::new();
        };
        let mut labels: Vec<Label> = self
            .labels
            .get(&kind)
            .map(|all| {
                all.iter()
                    .filter(|l| links.contains(&(recipe_id, l.id)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        labels.sort_by_key(|l| l.id);
        labels
    }

    fn detail(&self, recipe: &Recipe) -> RecipeDetail {
        RecipeDetail {
            recipe: recipe.clone(),
            tags: self.linked(LabelKind::Tag, recipe.id),
            ingredients: self.linked(LabelKind::Ingredient, recipe.id),
        }
    }

    fn remove_recipe(&mut self, id: i64) {
        self.recipes.retain(|r| r.id != id);
        for kind in LabelKind::ALL {
            self.links(kind).retain(|(rid, _)| *rid != id);
        }
    }

    fn remove_label(&mut self, kind: LabelKind, id: i64) {
        self.labels(kind).retain(|l| l.id != id);
        self.links(kind).retain(|(_, lid)| *lid != id);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.store_calls += 1;
        f(&mut state)
    }

    /// Number of repository calls served so far.
    pub fn store_calls(&self) -> usize {
        self.state.lock().expect("memory store poisoned").store_calls
    }

    pub fn label_count(&self, kind: LabelKind) -> usize {
        self.state
            .lock()
            .expect("memory store poisoned")
            .labels
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn recipe_count(&self) -> usize {
        self.state.lock().expect("memory store poisoned").recipes.len()
    }

    pub fn insert_user(&self, user: User) -> User {
        self.with(|state| {
            state.users.push(user.clone());
            user
        })
    }

    /// Seeds a label directly, bypassing the recipe write path.
    pub fn insert_label(&self, kind: LabelKind, owner: Uuid, name: &str) -> Label {
        self.with(|state| state.get_or_create(kind, owner, name))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.with(|state| {
            if state.users.iter().any(|u| u.email == user.email) {
                return Err(email_taken());
            }
            state.users.push(user.clone());
            Ok(user)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.with(|state| state.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.with(|state| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        Ok(self.with(|state| {
            let user = state.users.iter_mut().find(|u| u.id == id)?;
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(hash) = changes.password_hash {
                user.password_hash = hash;
            }
            Some(user.clone())
        }))
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<User>, DomainError> {
        self.with(|state| {
            if let Some(email) = &changes.email {
                if state.users.iter().any(|u| u.id != id && &u.email == email) {
                    return Err(email_taken());
                }
            }
            let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(hash) = changes.password_hash {
                user.password_hash = hash;
            }
            if let Some(flag) = changes.is_active {
                user.is_active = flag;
            }
            if let Some(flag) = changes.is_staff {
                user.is_staff = flag;
            }
            if let Some(flag) = changes.is_superuser {
                user.is_superuser = flag;
            }
            Ok(Some(user.clone()))
        })
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.with(|state| state.users.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.with(|state| {
            let before = state.users.len();
            state.users.retain(|u| u.id != id);
            if state.users.len() == before {
                return false;
            }
            let owned: Vec<i64> = state
                .recipes
                .iter()
                .filter(|r| r.user_id == id)
                .map(|r| r.id)
                .collect();
            for recipe_id in owned {
                state.remove_recipe(recipe_id);
            }
            for kind in LabelKind::ALL {
                let owned: Vec<i64> = state
                    .labels(kind)
                    .iter()
                    .filter(|l| l.user_id == id)
                    .map(|l| l.id)
                    .collect();
                for label_id in owned {
                    state.remove_label(kind, label_id);
                }
            }
            true
        }))
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, owner: Uuid, new: NewRecipe) -> Result<RecipeDetail, DomainError> {
        Ok(self.with(|state| {
            let now = Utc::now();
            let recipe = Recipe {
                id: state.next_id(),
                user_id: owner,
                title: new.title.clone(),
                time_minutes: new.time_minutes,
                price: new.price,
                description: new.description.clone(),
                link: new.link.clone(),
                created_at: now,
                updated_at: now,
            };
            state.recipes.push(recipe.clone());
            for kind in LabelKind::ALL {
                state.replace_links(kind, recipe.id, owner, new.labels(kind));
            }
            state.detail(&recipe)
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RecipeDetail>, DomainError> {
        Ok(self.with(|state| {
            state
                .recipes
                .iter()
                .find(|r| r.id == id)
                .map(|r| state.detail(r))
        }))
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<RecipeDetail>, DomainError> {
        Ok(self.with(|state| {
            let mut recipes: Vec<&Recipe> =
                state.recipes.iter().filter(|r| r.user_id == owner).collect();
            recipes.sort_by(|a, b| b.id.cmp(&a.id));
            recipes.into_iter().map(|r| state.detail(r)).collect()
        }))
    }

    async fn update(
        &self,
        owner: Uuid,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<RecipeDetail>, DomainError> {
        Ok(self.with(|state| {
            let recipe = state
                .recipes
                .iter_mut()
                .find(|r| r.id == id && r.user_id == owner)?;
            if let Some(title) = &changes.title {
                recipe.title = title.clone();
            }
            if let Some(minutes) = changes.time_minutes {
                recipe.time_minutes = minutes;
            }
            if let Some(price) = changes.price {
                recipe.price = price;
            }
            if let Some(description) = &changes.description {
                recipe.description = description.clone();
            }
            if let Some(link) = &changes.link {
                recipe.link = link.clone();
            }
            recipe.updated_at = Utc::now();
            let recipe = recipe.clone();

            for kind in LabelKind::ALL {
                if let Some(names) = changes.labels(kind) {
                    state.replace_links(kind, id, owner, names);
                }
            }
            Some(state.detail(&recipe))
        }))
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, DomainError> {
        Ok(self.with(|state| {
            let owned = state
                .recipes
                .iter()
                .any(|r| r.id == id && r.user_id == owner);
            if owned {
                state.remove_recipe(id);
            }
            owned
        }))
    }

    async fn list_all(&self) -> Result<Vec<RecipeDetail>, DomainError> {
        Ok(self.with(|state| {
            let mut recipes: Vec<&Recipe> = state.recipes.iter().collect();
            recipes.sort_by(|a, b| b.id.cmp(&a.id));
            recipes.into_iter().map(|r| state.detail(r)).collect()
        }))
    }

    async fn delete_any(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.with(|state| {
            let exists = state.recipes.iter().any(|r| r.id == id);
            if exists {
                state.remove_recipe(id);
            }
            exists
        }))
    }
}

#[async_trait]
impl LabelRepository for MemoryStore {
    async fn list_for_owner(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, DomainError> {
        Ok(self.with(|state| {
            let own_recipes: BTreeSet<i64> = state
                .recipes
                .iter()
                .filter(|r| r.user_id == owner)
                .map(|r| r.id)
                .collect();
            let used: BTreeSet<i64> = state
                .links(kind)
                .iter()
                .filter(|(rid, _)| own_recipes.contains(rid))
                .map(|(_, lid)| *lid)
                .collect();

            let mut labels: Vec<Label> = state
                .labels(kind)
                .iter()
                .filter(|l| l.user_id == owner)
                .filter(|l| !assigned_only || used.contains(&l.id))
                .cloned()
                .collect();
            labels.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
            labels
        }))
    }

    async fn find_by_id(&self, kind: LabelKind, id: i64) -> Result<Option<Label>, DomainError> {
        Ok(self.with(|state| state.labels(kind).iter().find(|l| l.id == id).cloned()))
    }

    async fn rename(
        &self,
        kind: LabelKind,
        owner: Uuid,
        id: i64,
        name: String,
    ) -> Result<Option<Label>, DomainError> {
        self.with(|state| {
            let labels = state.labels(kind);
            if labels
                .iter()
                .any(|l| l.user_id == owner && l.name == name && l.id != id)
            {
                return Err(duplicate_name(kind));
            }
            Ok(labels
                .iter_mut()
                .find(|l| l.id == id && l.user_id == owner)
                .map(|label| {
                    label.name = name;
                    label.clone()
                }))
        })
    }

    async fn delete(&self, kind: LabelKind, owner: Uuid, id: i64) -> Result<bool, DomainError> {
        Ok(self.with(|state| {
            let owned = state
                .labels(kind)
                .iter()
                .any(|l| l.id == id && l.user_id == owner);
            if owned {
                state.remove_label(kind, id);
            }
            owned
        }))
    }

    async fn list_all(&self, kind: LabelKind) -> Result<Vec<Label>, DomainError> {
        Ok(self.with(|state| {
            let mut labels = state.labels(kind).clone();
            labels.sort_by_key(|l| l.id);
            labels
        }))
    }

    async fn delete_any(&self, kind: LabelKind, id: i64) -> Result<bool, DomainError> {
        Ok(self.with(|state| {
            let exists = state.labels(kind).iter().any(|l| l.id == id);
            if exists {
                state.remove_label(kind, id);
            }
            exists
        }))
    }
}
