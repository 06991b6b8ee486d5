//! HTTP implementation of [`Backend`] on top of reqwest.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::backend::{Backend, RemoteReview, RemoteSession};
use crate::catalog::{Category, Technique};
use crate::error::ApiError;
use crate::handoff::{ReviewPayload, SessionHistoryPayload};
use crate::storage::ApiConfig;

const USER_AGENT: &str = concat!("acupress/", env!("CARGO_PKG_VERSION"));

pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for `config.base_url` (e.g. `http://localhost:8001/api`).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut base = Url::parse(&config.base_url)?;
        // `Url::join` drops the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let token = Some(config.token.trim().to_string()).filter(|t| !t.is_empty());
        Ok(Self { http, base, token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl Serialize>,
    ) -> Result<reqwest::Response, ApiError> {
        let method_name = match method {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            _ => "REQUEST",
        };
        debug!(method = method_name, %url, "backend request");

        let mut builder = self.request(method, url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method_name,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self.send(Method::GET, url, None::<&()>).await?;
        Ok(resp.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let resp = self.send(Method::POST, url, Some(body)).await?;
        Ok(resp.json().await?)
    }
}

impl Backend for ApiClient {
    async fn techniques(&self, category: Option<Category>) -> Result<Vec<Technique>, ApiError> {
        let mut url = self.url("techniques")?;
        if let Some(category) = category {
            url.query_pairs_mut()
                .append_pair("category", &category.to_string());
        }
        self.get_json(url).await
    }

    async fn technique(&self, id: &str) -> Result<Technique, ApiError> {
        let url = self.url(&format!("techniques/{id}"))?;
        self.get_json(url).await
    }

    async fn favorites(&self) -> Result<Vec<Technique>, ApiError> {
        self.get_json(self.url("favorites")?).await
    }

    async fn add_favorite(&self, technique_id: &str) -> Result<(), ApiError> {
        let body = json!({ "technique_id": technique_id });
        self.send(Method::POST, self.url("favorites")?, Some(&body))
            .await?;
        Ok(())
    }

    async fn remove_favorite(&self, technique_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("favorites/{technique_id}"))?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn create_session(
        &self,
        payload: &SessionHistoryPayload,
    ) -> Result<RemoteSession, ApiError> {
        self.post_json(self.url("sessions")?, payload).await
    }

    async fn sessions(&self) -> Result<Vec<RemoteSession>, ApiError> {
        self.get_json(self.url("sessions")?).await
    }

    async fn create_review(&self, payload: &ReviewPayload) -> Result<RemoteReview, ApiError> {
        self.post_json(self.url("reviews/create")?, payload).await
    }
}
