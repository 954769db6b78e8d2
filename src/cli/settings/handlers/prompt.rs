//! Prompt-file settings. These live beside `config.toml`, not inside it.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    System,
    User,
}

pub struct PromptHandler {
    kind: PromptKind,
}

impl PromptHandler {
    pub fn new(kind: PromptKind) -> Self {
        Self { kind }
    }

    fn save(&self, ctx: &SetContext<'_>, text: &str) -> Result<(), SettingError> {
        match self.kind {
            PromptKind::System => Config::save_system_prompt(ctx.config_path, text)?,
            PromptKind::User => Config::save_user_prompt(ctx.config_path, text)?,
        }
        Ok(())
    }
}

impl SettingHandler for PromptHandler {
    fn key(&self) -> &'static str {
        match self.kind {
            PromptKind::System => "system-prompt",
            PromptKind::User => "user-prompt",
        }
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To save a default prompt, provide its text:",
                example: "aireports set system-prompt \"You write concise sales reports.\"",
            });
        }
        let text = args.join(" ");
        self.save(ctx, &text)?;
        Ok(format!(
            "✅ Saved {} ({} characters)",
            self.key(),
            text.chars().count()
        ))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        self.save(ctx, "")?;
        Ok(format!("✅ Cleared {}", self.key()))
    }

    fn writes_config(&self) -> bool {
        false
    }
}
