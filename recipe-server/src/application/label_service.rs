use std::sync::Arc;

use crate::data::label_repository::LabelRepository;
use crate::domain::error::DomainError;
use crate::domain::label::{Label, LabelKind};
use crate::domain::ownership::ensure_owner;
use tracing::instrument;
use uuid::Uuid;

/// Tags and ingredients: listed, renamed and deleted, never created directly.
#[derive(Clone)]
pub struct LabelService {
    repo: Arc<dyn LabelRepository>,
}

impl LabelService {
    pub fn new(repo: Arc<dyn LabelRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_labels(
        &self,
        kind: LabelKind,
        caller: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, DomainError> {
        self.repo.list_for_owner(kind, caller, assigned_only).await
    }

    async fn owned(&self, kind: LabelKind, caller: Uuid, id: i64) -> Result<Label, DomainError> {
        let label = self.repo.find_by_id(kind, id).await?;
        ensure_owner(caller, label, || kind.not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn rename_label(
        &self,
        kind: LabelKind,
        caller: Uuid,
        id: i64,
        name: String,
    ) -> Result<Label, DomainError> {
        self.owned(kind, caller, id).await?;
        self.repo
            .rename(kind, caller, id, name)
            .await?
            .ok_or_else(|| kind.not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_label(
        &self,
        kind: LabelKind,
        caller: Uuid,
        id: i64,
    ) -> Result<(), DomainError> {
        self.owned(kind, caller, id).await?;
        if self.repo.delete(kind, caller, id).await? {
            Ok(())
        } else {
            Err(kind.not_found(id))
        }
    }
}
