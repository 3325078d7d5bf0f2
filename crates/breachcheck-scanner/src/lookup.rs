//! Exposure lookup against the remote breach service.

use crate::classifier::{classify, Exposure, ExposureResponse};
use crate::error::LookupError;
use async_trait::async_trait;
use breachcheck_core::{CandidateEmail, LookupConfig};
use reqwest::Client;
use std::time::Duration;

/// Longest response body excerpt kept in an HTTP error.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Outcome of one lookup.
pub type LookupOutcome = std::result::Result<Exposure, LookupError>;

/// A single exposure query. Implementations perform no retries.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Query the exposure of one email address.
    async fn lookup(&self, email: &CandidateEmail) -> LookupOutcome;
}

/// `LookupClient` backed by an HTTP GET endpoint returning JSON.
pub struct HttpLookupClient {
    client: Client,
    endpoint: String,
    query_param: String,
}

impl HttpLookupClient {
    /// Create a client from lookup settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        Self::build(config, config.timeout())
    }

    /// Create a client with a timeout finer than whole seconds.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(config: &LookupConfig, timeout: Duration) -> Result<Self, LookupError> {
        Self::build(config, timeout)
    }

    fn build(config: &LookupConfig, timeout: Duration) -> Result<Self, LookupError> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| LookupError::Client {
                detail: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            query_param: config.query_param.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn lookup(&self, email: &CandidateEmail) -> LookupOutcome {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[(self.query_param.as_str(), email.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LookupError::Http {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response.text().await?;
        let parsed = ExposureResponse::from_json(&body)?;
        Ok(classify(&parsed))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
