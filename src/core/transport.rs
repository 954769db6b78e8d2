use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio_util::sync::CancellationToken;

use crate::api::models::fetch_models;
use crate::api::{ChatRequest, ModelsResponse};
use crate::core::config::ApiSettings;
use crate::core::error::ClientError;

/// One HTTP client bound to one credential.
///
/// The bearer header and timeout are fixed at construction. Every call issues
/// exactly one request; retrying is left to the caller.
///
/// The timeout bounds the wait for response headers and any single silence
/// while the body streams. A body that keeps producing data is never cut off.
#[derive(Clone)]
pub struct TransportSession {
    client: reqwest::Client,
    endpoint: String,
    base_url: String,
    timeout: Duration,
}

impl TransportSession {
    pub fn new(settings: &ApiSettings, timeout: Duration) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|err| ClientError::fatal("API key is not a valid header value", err))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|err| ClientError::fatal("Could not create HTTP client", err))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            base_url: settings.base_url.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `request` and return the response once a 2xx status arrives.
    ///
    /// Any other status fails with [`ClientError::Transport`] carrying the
    /// body verbatim; the body is never handed to the stream decoder.
    pub async fn execute(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, ClientError> {
        let send = tokio::time::timeout(
            self.timeout,
            self.client.post(&self.endpoint).json(request).send(),
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            response = send => response
                .map_err(|elapsed| ClientError::fatal("Timed out waiting for the chat endpoint", elapsed))?
                .map_err(|err| ClientError::fatal("Request to the chat endpoint failed", err))?,
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            body = response.text() => body.unwrap_or_else(|_| "<no body>".to_string()),
        };

        Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        })
    }

    /// List the models available to this credential.
    pub async fn list_models(&self) -> Result<ModelsResponse, ClientError> {
        tokio::time::timeout(self.timeout, fetch_models(&self.client, &self.base_url))
            .await
            .map_err(|elapsed| ClientError::fatal("Timed out listing models", elapsed))?
    }
}
