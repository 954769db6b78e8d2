use serde::{Deserialize, Deserializer, Serialize};

pub mod models;

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

/// Body of one streaming chat-completion call.
///
/// Built once per request by [`crate::core::request::RequestBuilder`] and
/// serialized exactly once by the transport.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub max_tokens: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// System messages carry plain text; user messages carry ordered content parts.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Image { source: ImageSource },
    Text { text: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::Image { .. })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct StreamChoice {
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Option<StreamDelta>,
}

/// One decoded record of the response stream. Unknown fields are ignored.
#[derive(Deserialize, Debug, Default)]
pub struct StreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<StreamChoice>,
}

/// Some servers send `"choices": null` on keep-alive records.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "error": ... }` envelope returned by chat-completion servers.
///
/// Servers disagree on the shape of `error`, so both the object form and a
/// bare string are accepted. Some servers skip the envelope and put a
/// `message` at the top level.
#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ErrorBody {
    Detail(ErrorDetail),
    Text(String),
}

#[derive(Deserialize, Debug, Default)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub param: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    pub fn message(&self) -> Option<&str> {
        let nested = match &self.error {
            Some(ErrorBody::Detail(detail)) => detail.message.as_deref(),
            Some(ErrorBody::Text(text)) => Some(text.as_str()),
            None => None,
        };
        nested
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PricingInfo {
    #[serde(default)]
    pub input: f64,
    #[serde(default)]
    pub cached_input: Option<f64>,
    #[serde(default)]
    pub output: f64,
    #[serde(default)]
    pub audio_input: Option<f64>,
    #[serde(default)]
    pub audio_cached_input: Option<f64>,
    #[serde(default)]
    pub audio_output: Option<f64>,
    #[serde(default)]
    pub input_cost_per_page: Option<f64>,
    #[serde(default)]
    pub input_cost_per_character: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub pricing: Option<PricingInfo>,
    #[serde(default)]
    pub max_tokens: Option<f64>,
    #[serde(default)]
    pub max_input_tokens: Option<f64>,
    #[serde(default)]
    pub max_output_tokens: Option<f64>,
    #[serde(default)]
    pub supports_vision: Option<bool>,
    #[serde(default)]
    pub supports_system_messages: Option<bool>,
    #[serde(default)]
    pub supports_native_streaming: Option<bool>,
    #[serde(default)]
    pub supported_endpoints: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ModelsResponse {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}
