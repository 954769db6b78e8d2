//! Numeric setting handlers.

use std::fmt::Display;
use std::str::FromStr;

use crate::cli::settings::error::SettingError;
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::defaults::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
use crate::core::config::Config;

pub struct NumberHandler<T> {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default: T,
    set_field: fn(&mut Config, Option<T>),
}

impl<T> SettingHandler for NumberHandler<T>
where
    T: FromStr + Display + Copy + Send + Sync,
{
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        };

        let value = input
            .trim()
            .parse::<T>()
            .map_err(|_| SettingError::InvalidNumber {
                key: self.key,
                input: input.clone(),
            })?;
        (self.set_field)(ctx.config, Some(value));
        Ok(format!("✅ Set {} to: {value}", self.key))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        (self.set_field)(ctx.config, None);
        Ok(format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default
        ))
    }
}

pub fn max_tokens_handler() -> NumberHandler<u32> {
    NumberHandler {
        key: "max-tokens",
        hint: "To set the response token ceiling, give a number:",
        example: "aireports set max-tokens 16000",
        default: DEFAULT_MAX_TOKENS,
        set_field: |c, v| c.max_tokens = v,
    }
}

pub fn timeout_handler() -> NumberHandler<u64> {
    NumberHandler {
        key: "timeout-secs",
        hint: "To set the request timeout, give a number of seconds:",
        example: "aireports set timeout-secs 600",
        default: DEFAULT_TIMEOUT_SECS,
        set_field: |c, v| c.timeout_secs = v,
    }
}

pub fn max_retries_handler() -> NumberHandler<u32> {
    NumberHandler {
        key: "max-retries",
        hint: "To set the stored retry count, give a number:",
        example: "aireports set max-retries 3",
        default: DEFAULT_MAX_RETRIES,
        set_field: |c, v| c.max_retries = v,
    }
}
