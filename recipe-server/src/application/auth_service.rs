use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::user::{AccountChanges, ProfileChanges};
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    /// Resolves a bearer token to an active user.
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self
            .keys
            .verify_token(token)
            .map_err(|_| DomainError::Unauthorized)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;
        match self.repo.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(DomainError::Unauthorized),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: String,
        name: String,
        password: String,
    ) -> Result<User, DomainError> {
        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(email.to_lowercase(), name, hash);
        self.repo.create(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid || !user.is_active {
            return Err(DomainError::Unauthorized);
        }

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<User, DomainError> {
        let password_hash = password
            .map(|p| hash_password(&p))
            .transpose()
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        self.repo
            .update_profile(id, ProfileChanges { name, password_hash })
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    /// Makes sure a staff superuser with these credentials exists.
    pub async fn ensure_superuser(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        let hash = hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;

        let user = match self.repo.find_by_email(&email).await? {
            Some(existing) => self
                .repo
                .update_account(
                    existing.id,
                    AccountChanges {
                        password_hash: Some(hash),
                        is_active: Some(true),
                        is_staff: Some(true),
                        is_superuser: Some(true),
                        ..Default::default()
                    },
                )
                .await?
                .ok_or(DomainError::UserNotFound(existing.id))?,
            None => self.repo.create(User::superuser(email, hash)).await?,
        };

        info!(user_id = %user.id, email = %user.email, "superuser ensured");
        Ok(user)
    }
}
