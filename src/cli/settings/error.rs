//! Error types for settings operations.

use crate::core::config::ConfigError;

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid boolean value: {0}")]
    InvalidBoolean(String),

    #[error("Invalid number for {key}: {input}")]
    InvalidNumber { key: &'static str, input: String },

    #[error("{hint}")]
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Run 'aireports config' to see the available keys");
            }
            SettingError::InvalidBoolean(input) => {
                eprintln!("❌ Invalid boolean value: {input}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::InvalidNumber { key, input } => {
                eprintln!("❌ {key} expects a whole number, got: {input}");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::Config(err) => {
                eprintln!("❌ Failed to save configuration: {err}");
            }
        }
    }
}
