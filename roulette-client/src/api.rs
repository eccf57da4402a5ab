//! Definitions service API.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use roulette_features::GroupDefinition;
use roulette_log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request for one page of feature definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFeaturesRequest {
    /// Cursor returned by the previous page; empty on the first request
    #[serde(default)]
    pub cursor: String,
}

impl ListFeaturesRequest {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
        }
    }
}

/// One page of feature definitions and the groups they reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFeaturesResponse {
    /// Cursor to send for the next page
    #[serde(default)]
    pub cursor: String,

    /// Raw feature definitions, decoded one by one by the fetcher
    #[serde(default)]
    pub features: Vec<Value>,

    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

/// Source of paginated feature definitions.
#[async_trait]
pub trait RouletteApi: Send + Sync {
    /// Fetch the page that follows `request.cursor`.
    async fn list_features(&self, request: ListFeaturesRequest) -> Result<ListFeaturesResponse>;
}

/// JSON-over-HTTP definitions API.
pub struct HttpRouletteApi {
    url: String,
    client: reqwest::Client,
}

impl HttpRouletteApi {
    /// Create an API client for the configured service.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use roulette_client::{ClientConfig, HttpRouletteApi};
    ///
    /// let api = HttpRouletteApi::new(&ClientConfig::new("http://localhost:8080"))?;
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            url: config.list_features_url(),
            client,
        })
    }

    /// The full URL of the feature listing endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RouletteApi for HttpRouletteApi {
    async fn list_features(&self, request: ListFeaturesRequest) -> Result<ListFeaturesResponse> {
        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Response {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let page: ListFeaturesResponse = serde_json::from_slice(&body)?;
        debug!(
            "Fetched {} features and {} groups at cursor '{}'",
            page.features.len(),
            page.groups.len(),
            page.cursor
        );
        Ok(page)
    }
}
