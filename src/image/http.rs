use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;

use crate::config::ImageConfig;

use super::{ImageLookup, LookupError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    urls: HitUrls,
}

#[derive(Debug, Deserialize)]
struct HitUrls {
    small: Option<String>,
    regular: Option<String>,
}

/// Image search over HTTP, expecting `{"results":[{"urls":{"small":..}}]}`.
#[derive(Debug, Clone)]
pub struct HttpImageLookup {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpImageLookup {
    /// Builds a client from the `[image]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ImageConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ImageLookup for HttpImageLookup {
    async fn first_image(&self, query: &str) -> Result<Option<String>, LookupError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query), ("per_page", "1")]);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Client-ID {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let url = first_url_from_body(&body)?;
        debug!(query, found = url.is_some(), "image search answered");
        Ok(url)
    }
}

fn first_url_from_body(body: &str) -> Result<Option<String>, LookupError> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed
        .results
        .into_iter()
        .next()
        .and_then(|hit| hit.urls.small.or(hit.urls.regular)))
}
