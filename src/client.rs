//! Exa API client seam.
//!
//! The node talks to Exa through the [`ExaApi`] trait: six asynchronous
//! operations, each returning the remote JSON response body. [`ExaClient`]
//! is the thin reqwest-backed implementation; tests substitute a mock.
//!
//! No retry, backoff, or caching lives here. A non-2xx response becomes a
//! node error carrying the status and body text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::credentials::SecretKey;
use crate::error::{Error, Result};

/// Base URL of the Exa API.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client configuration.
///
/// Defaults come from the environment:
/// - `EXA_BASE_URL`: override the API base URL (for proxies and tests)
/// - `EXA_TIMEOUT_SECONDS`: request timeout in seconds (default: 30)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("EXA_BASE_URL").unwrap_or_else(|_| default_base_url()),
            timeout_seconds: std::env::var("EXA_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout_seconds),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

/// Options for `search` and `searchAndContents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_autoprompt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<bool>,
}

/// Options for `findSimilar` and `findSimilarAndContents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSimilarOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_source_domain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<bool>,
}

/// Options for `getContents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsOptions {
    pub text: bool,
}

/// Options for `answer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The six Exa operations the node dispatches to.
#[async_trait]
pub trait ExaApi: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Value>;

    async fn search_and_contents(&self, query: &str, options: &SearchOptions) -> Result<Value>;

    async fn find_similar(&self, url: &str, options: &FindSimilarOptions) -> Result<Value>;

    async fn find_similar_and_contents(
        &self,
        url: &str,
        options: &FindSimilarOptions,
    ) -> Result<Value>;

    async fn get_contents(&self, urls: &[String], options: &ContentsOptions) -> Result<Value>;

    async fn answer(&self, question: &str, options: &AnswerOptions) -> Result<Value>;
}

/// Reqwest-backed Exa client. One instance per node execution, reused for
/// every item.
pub struct ExaClient {
    http: Client,
    base_url: String,
    api_key: SecretKey,
}

impl ExaClient {
    /// Create a client with default configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(DEFAULT_HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout defaults: {}", e);
                Client::new()
            });

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: SecretKey::new(api_key),
        }
    }

    /// POST `body` to `path` and parse the JSON response.
    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let start = std::time::Instant::now();
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| {
            Error::Node(format!("Failed to read response body from {}: {}", path, e))
        })?;

        if status >= 400 {
            return Err(Error::Node(format!(
                "POST {} -> {}: {}",
                path, status, body_text
            )));
        }

        info!("POST {} -> {} ({}ms)", url, status, duration.as_millis());

        serde_json::from_str(&body_text)
            .map_err(|e| Error::Node(format!("POST {} returned non-JSON body: {}", path, e)))
    }

    /// Serialize `options` and splice in the operation's positional field.
    fn build_body<T: Serialize>(options: &T, key: &str, value: Value) -> Result<Value> {
        let mut body = match serde_json::to_value(options)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        body.insert(key.to_string(), value);
        Ok(Value::Object(body))
    }
}

#[async_trait]
impl ExaApi for ExaClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Value> {
        let body = Self::build_body(options, "query", Value::String(query.to_string()))?;
        self.post("/search", body).await
    }

    async fn search_and_contents(&self, query: &str, options: &SearchOptions) -> Result<Value> {
        let body = Self::build_body(options, "query", Value::String(query.to_string()))?;
        self.post("/search", body).await
    }

    async fn find_similar(&self, url: &str, options: &FindSimilarOptions) -> Result<Value> {
        let body = Self::build_body(options, "url", Value::String(url.to_string()))?;
        self.post("/findSimilar", body).await
    }

    async fn find_similar_and_contents(
        &self,
        url: &str,
        options: &FindSimilarOptions,
    ) -> Result<Value> {
        let body = Self::build_body(options, "url", Value::String(url.to_string()))?;
        self.post("/findSimilar", body).await
    }

    async fn get_contents(&self, urls: &[String], options: &ContentsOptions) -> Result<Value> {
        let body = Self::build_body(
            options,
            "urls",
            Value::Array(urls.iter().cloned().map(Value::String).collect()),
        )?;
        self.post("/contents", body).await
    }

    async fn answer(&self, question: &str, options: &AnswerOptions) -> Result<Value> {
        let body = Self::build_body(options, "question", Value::String(question.to_string()))?;
        self.post("/answer", body).await
    }
}
