use crate::api::generate::generate_content;
use crate::api::models::{fetch_models, ListingFailure};
use crate::api::{ApiError, ModelInfo};
use crate::core::credentials::Credential;
use crate::core::generation::TextBackend;
use crate::core::models::ModelCatalog;
use crate::utils::url::normalize_base_url;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Authenticated Gemini REST client with a fixed per-request timeout.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("artrestorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            api_key: credential.value().to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &crate::utils::auth::mask_key(&self.api_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl ModelCatalog for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ListingFailure> {
        fetch_models(&self.http, &self.base_url, &self.api_key, self.timeout).await
    }
}

#[async_trait]
impl TextBackend for GeminiClient {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, ApiError> {
        generate_content(
            &self.http,
            &self.base_url,
            &self.api_key,
            model,
            prompt,
            self.timeout,
        )
        .await
    }
}
