//! Boolean setting handlers for on/off settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, parse_bool};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::Config;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        (self.set_field)(ctx.config, Some(value));
        Ok(format!("✅ Set {} to: {}", self.key, format_bool(value)))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        (self.set_field)(ctx.config, None);
        Ok(format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        ))
    }
}

/// Create a handler for the `detailed-logging` setting.
pub fn detailed_logging_handler() -> BooleanHandler {
    BooleanHandler {
        key: "detailed-logging",
        hint: "To log previews of unreadable stream records, specify on or off:",
        example: "aireports set detailed-logging on",
        default_display: "off",
        set_field: |c, v| c.detailed_logging = v,
    }
}
