use crate::api::{ModelInfo, ModelsResponse, PricingInfo};
use crate::core::error::ClientError;
use crate::utils::url::construct_api_url;

/// Fetch the model catalogue exposed at `<base_url>/models`.
///
/// The client is expected to carry the bearer header already (see
/// [`crate::core::transport::TransportSession::list_models`]).
pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<ModelsResponse, ClientError> {
    let models_url = construct_api_url(base_url, "models");
    let response = client
        .get(models_url)
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|err| ClientError::fatal("Model listing request failed", err))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(ClientError::Transport { status, body });
    }

    let body = response
        .text()
        .await
        .map_err(|err| ClientError::fatal("Model listing body could not be read", err))?;
    serde_json::from_str::<ModelsResponse>(&body)
        .map_err(|err| ClientError::fatal("Model listing response is not valid JSON", err))
}

/// Keep only chat-capable models, ordered by id.
pub fn chat_models(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    let mut chat: Vec<ModelInfo> = models
        .into_iter()
        .filter(|model| model.mode.as_deref() == Some("chat"))
        .collect();
    sort_models(&mut chat);
    chat
}

pub fn sort_models(models: &mut [ModelInfo]) {
    models.sort_by(|a, b| a.id.cmp(&b.id));
}

impl ModelInfo {
    pub fn max_tokens_or_zero(&self) -> u64 {
        self.max_tokens.map(|v| v as u64).unwrap_or(0)
    }

    pub fn max_output_tokens_or_zero(&self) -> u64 {
        self.max_output_tokens.map(|v| v as u64).unwrap_or(0)
    }
}

impl PricingInfo {
    /// One-line price summary as shown in the model picker.
    pub fn display_price(&self) -> String {
        if let Some(per_char) = self.input_cost_per_character {
            return format!("Per Char: {per_char:.6}");
        }

        if let Some(per_page) = self.input_cost_per_page {
            return format!("Per Page: {per_page:.3} | Out: {:.2}", self.output);
        }

        let mut result = format!("In: {:.2} | Out: {:.2}", self.input, self.output);
        if let Some(cached) = self.cached_input {
            result.push_str(&format!(" | Cached: {cached:.2}"));
        }
        if let Some(audio) = self.audio_input {
            result.push_str(&format!(" | Audio In: {audio:.2}"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(id: &str, mode: Option<&str>) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            mode: mode.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn chat_models_filters_and_orders_by_id() {
        let models = vec![
            model("zeta", Some("chat")),
            model("embed-1", Some("embedding")),
            model("alpha", Some("chat")),
            model("unknown", None),
        ];

        let ids: Vec<String> = chat_models(models).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn display_price_prefers_character_then_page_pricing() {
        let per_char = PricingInfo {
            input_cost_per_character: Some(0.000125),
            input_cost_per_page: Some(1.0),
            ..Default::default()
        };
        assert_eq!(per_char.display_price(), "Per Char: 0.000125");

        let per_page = PricingInfo {
            input_cost_per_page: Some(0.01),
            output: 2.5,
            ..Default::default()
        };
        assert_eq!(per_page.display_price(), "Per Page: 0.010 | Out: 2.50");

        let tokens = PricingInfo {
            input: 1.0,
            output: 4.0,
            cached_input: Some(0.5),
            audio_input: Some(3.0),
            ..Default::default()
        };
        assert_eq!(
            tokens.display_price(),
            "In: 1.00 | Out: 4.00 | Cached: 0.50 | Audio In: 3.00"
        );
    }

    #[tokio::test]
    async fn fetch_models_parses_catalogue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"object":"list","data":[
                    {"id":"gpt-x","owned_by":"lab","mode":"chat","max_tokens":128000.0,
                     "pricing":{"input":1.0,"output":2.0}},
                    {"id":"embed","mode":"embedding"}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = fetch_models(&client, &format!("{}/v1/", server.uri()))
            .await
            .expect("models should load");

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].max_tokens_or_zero(), 128000);
        assert_eq!(
            response.data[0]
                .pricing
                .as_ref()
                .map(PricingInfo::display_price)
                .as_deref(),
            Some("In: 1.00 | Out: 2.00")
        );
    }

    #[tokio::test]
    async fn fetch_models_reports_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_models(&client, &server.uri())
            .await
            .expect_err("status should fail");

        match err {
            ClientError::Transport { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
