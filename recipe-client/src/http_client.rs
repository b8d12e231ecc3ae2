use crate::error::RecipeClientError;
use crate::{AuthResponse, Label, LabelKind, Recipe, RecipeClientTrait, RecipeInput, User};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const TOKEN_FILE: &str = ".recipe_token";

#[derive(Clone)]
pub struct RecipeClientHttp {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
    token_path: PathBuf,
}

impl RecipeClientHttp {
    pub async fn connect(endpoint: &str) -> Result<Self, RecipeClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url,
            token: None,
            token_path: PathBuf::from(TOKEN_FILE),
        })
    }

    /// Stores the token somewhere other than `.recipe_token` in the working dir.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn set_token(&mut self, token: String) -> Result<(), RecipeClientError> {
        fs::write(&self.token_path, &token)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, RecipeClientError> {
        let token = match &self.token {
            Some(t) if !t.is_empty() => t.clone(),
            _ => fs::read_to_string(&self.token_path)
                .map_err(|_| RecipeClientError::Unauthorized)?
                .trim()
                .to_string(),
        };
        if token.is_empty() {
            return Err(RecipeClientError::Unauthorized);
        }
        Ok(format!("Bearer {}", token))
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, RecipeClientError> {
        Ok(req.header(reqwest::header::AUTHORIZATION, self.bearer()?))
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, RecipeClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(RecipeClientError::from_http_response(resp).await)
        }
    }

    async fn empty(resp: Response) -> Result<(), RecipeClientError> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(RecipeClientError::from_http_response(resp).await)
        }
    }

    async fn authenticate(
        &mut self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), RecipeClientError> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        let auth: AuthResponse = Self::json(resp).await?;
        self.set_token(auth.access_token)
    }
}

#[async_trait(?Send)]
impl RecipeClientTrait for RecipeClientHttp {
    async fn register(
        &mut self,
        email: String,
        password: String,
        name: String,
    ) -> Result<(), RecipeClientError> {
        self.authenticate(
            "auth/register",
            serde_json::json!({
                "email": email,
                "password": password,
                "name": name,
            }),
        )
        .await
    }

    async fn login(&mut self, email: String, password: String) -> Result<(), RecipeClientError> {
        self.authenticate(
            "auth/login",
            serde_json::json!({
                "email": email,
                "password": password,
            }),
        )
        .await
    }

    async fn me(&mut self) -> Result<User, RecipeClientError> {
        let req = self.authorized(self.client.get(self.url("users/me")))?;
        Self::json(req.send().await?).await
    }

    async fn list_recipes(&mut self) -> Result<Vec<Recipe>, RecipeClientError> {
        let req = self.authorized(self.client.get(self.url("recipes")))?;
        Self::json(req.send().await?).await
    }

    async fn get_recipe(&mut self, id: i64) -> Result<Recipe, RecipeClientError> {
        let req = self.authorized(self.client.get(self.url(&format!("recipes/{}", id))))?;
        Self::json(req.send().await?).await
    }

    async fn create_recipe(&mut self, input: RecipeInput) -> Result<Recipe, RecipeClientError> {
        let req = self.authorized(self.client.post(self.url("recipes")))?;
        Self::json(req.json(&input).send().await?).await
    }

    async fn update_recipe(
        &mut self,
        id: i64,
        input: RecipeInput,
        replace: bool,
    ) -> Result<Recipe, RecipeClientError> {
        let url = self.url(&format!("recipes/{}", id));
        let req = if replace {
            self.client.put(url)
        } else {
            self.client.patch(url)
        };
        let req = self.authorized(req)?;
        Self::json(req.json(&input).send().await?).await
    }

    async fn delete_recipe(&mut self, id: i64) -> Result<(), RecipeClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("recipes/{}", id))))?;
        Self::empty(req.send().await?).await
    }

    async fn list_labels(
        &mut self,
        kind: LabelKind,
        assigned_only: bool,
    ) -> Result<Vec<Label>, RecipeClientError> {
        let mut req = self.authorized(self.client.get(self.url(kind.path())))?;
        if assigned_only {
            req = req.query(&[("assigned_only", "1")]);
        }
        Self::json(req.send().await?).await
    }

    async fn rename_label(
        &mut self,
        kind: LabelKind,
        id: i64,
        name: String,
    ) -> Result<Label, RecipeClientError> {
        let url = self.url(&format!("{}/{}", kind.path(), id));
        let req = self.authorized(self.client.patch(url))?;
        Self::json(req.json(&serde_json::json!({ "name": name })).send().await?).await
    }

    async fn delete_label(&mut self, kind: LabelKind, id: i64) -> Result<(), RecipeClientError> {
        let url = self.url(&format!("{}/{}", kind.path(), id));
        let req = self.authorized(self.client.delete(url))?;
        Self::empty(req.send().await?).await
    }
}
