use std::time::Duration;

use crate::core::config::data::{ApiSettings, ClientOptions, Config};
use crate::core::config::io::ConfigError;
use crate::utils::url::{base_url_from_endpoint, chat_completions_url, normalize_base_url};

pub const DEFAULT_MAX_TOKENS: u32 = 16000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const ENV_API_KEY: &str = "AIREPORTS_API_KEY";
pub const ENV_BASE_URL: &str = "AIREPORTS_BASE_URL";
pub const ENV_ENDPOINT: &str = "AIREPORTS_ENDPOINT";
pub const ENV_MODEL: &str = "AIREPORTS_MODEL";

impl Config {
    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Resolve the connection details a transport session needs.
    ///
    /// The endpoint falls back to `<base_url>/chat/completions`; the base URL
    /// falls back to the endpoint with that suffix removed.
    pub fn api_settings(&self) -> Result<ApiSettings, ConfigError> {
        let api_key = non_empty(self.api_key.as_deref())
            .ok_or(ConfigError::Missing { key: "api-key" })?;

        let base_url = non_empty(self.base_url.as_deref()).map(normalize_base_url);
        let endpoint = non_empty(self.endpoint.as_deref())
            .map(|endpoint| endpoint.trim().to_string())
            .or_else(|| base_url.as_deref().map(chat_completions_url))
            .ok_or(ConfigError::Missing { key: "endpoint" })?;
        let base_url = base_url.unwrap_or_else(|| base_url_from_endpoint(&endpoint));

        Ok(ApiSettings {
            base_url,
            endpoint,
            api_key: api_key.to_string(),
            max_tokens: self.max_tokens_or_default(),
        })
    }

    /// Resolve per-request options. `model` overrides the configured model.
    pub fn client_options(&self, model: Option<&str>) -> Result<ClientOptions, ConfigError> {
        let model = non_empty(model)
            .or_else(|| non_empty(self.model.as_deref()))
            .ok_or(ConfigError::Missing { key: "model" })?;

        Ok(ClientOptions {
            model: model.to_string(),
            max_tokens: self.max_tokens_or_default(),
            timeout: self.timeout(),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            detailed_logging: self.detailed_logging.unwrap_or(false),
        })
    }

    /// Apply `AIREPORTS_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(value) = read(ENV_API_KEY) {
            self.api_key = Some(value);
        }
        if let Some(value) = read(ENV_BASE_URL) {
            self.base_url = Some(value);
        }
        if let Some(value) = read(ENV_ENDPOINT) {
            self.endpoint = Some(value);
        }
        if let Some(value) = read(ENV_MODEL) {
            self.model = Some(value);
        }
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
