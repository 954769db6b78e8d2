//! Text setting handlers.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::truncate_with_ellipsis;
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::Config;
use crate::utils::url::normalize_base_url;

pub struct TextHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    secret: bool,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for TextHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let value = args.join(" ").trim().to_string();
        if value.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let display = if self.secret {
            "(hidden)".to_string()
        } else {
            truncate_with_ellipsis(&value, 60)
        };
        (self.set_field)(ctx.config, Some(value));
        Ok(format!("✅ Set {} to: {display}", self.key))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        (self.set_field)(ctx.config, None);
        Ok(format!("✅ Unset {}", self.key))
    }
}

pub fn base_url_handler() -> TextHandler {
    TextHandler {
        key: "base-url",
        hint: "To set the API base URL, provide it:",
        example: "aireports set base-url https://api.example.com/v1",
        secret: false,
        set_field: |c, v| c.base_url = v.map(|url| normalize_base_url(&url)),
    }
}

pub fn endpoint_handler() -> TextHandler {
    TextHandler {
        key: "endpoint",
        hint: "To set the chat-completions URL, provide it:",
        example: "aireports set endpoint https://api.example.com/v1/chat/completions",
        secret: false,
        set_field: |c, v| c.endpoint = v,
    }
}

pub fn api_key_handler() -> TextHandler {
    TextHandler {
        key: "api-key",
        hint: "To set the API key, provide it:",
        example: "aireports set api-key sk-...",
        secret: true,
        set_field: |c, v| c.api_key = v,
    }
}

pub fn model_handler() -> TextHandler {
    TextHandler {
        key: "model",
        hint: "To set the default model, provide its id. Run 'aireports models' to list them:",
        example: "aireports set model gpt-4o",
        secret: false,
        set_field: |c, v| c.model = v,
    }
}
