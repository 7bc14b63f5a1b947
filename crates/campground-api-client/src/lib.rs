//! Shared HTTP client for the campground API.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key),
//! GET/POST/PUT helpers, and the campground image endpoints. The CLI
//! uses this client directly; [`HttpImageRecorder`] plugs it into the upload
//! pipeline.

pub mod api;
pub mod recorder;

use anyhow::{Context, Result};
use campground_core::constants::API_PREFIX;
use campground_core::Config;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use recorder::HttpImageRecorder;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
    /// No credentials (local development servers)
    Anonymous,
}

/// HTTP client for the campground API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from loaded configuration. Uses X-API-Key auth when
    /// CAMPGROUND_API_KEY is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = match &config.api_key {
            Some(key) => Auth::XApiKey(key.clone()),
            None => Auth::Anonymous,
        };
        Self::new(config.api_url.clone(), auth)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
            Auth::Anonymous => request,
        }
    }

    /// Send with auth applied; non-2xx responses become errors carrying the body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = self.apply_auth(request);
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        Ok(response)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body, ignoring any response body.
    pub async fn post_json_no_content<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.send(self.client.post(self.build_url(path)).json(body))
            .await?;
        Ok(())
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.client.put(self.build_url(path)).json(body))
            .await?;
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// Request builder with auth applied, for custom requests.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.apply_auth(self.client.request(method, self.build_url(path)))
    }
}
