//! Settings management for CLI set/unset commands.
//!
//! Each key is served by a [`SettingHandler`]. Handlers are data-driven by
//! value shape:
//!
//! - Text settings (`base-url`, `endpoint`, `api-key`, `model`)
//! - Numeric settings (`max-tokens`, `timeout-secs`, `max-retries`)
//! - Boolean settings (`detailed-logging`)
//! - Prompt files (`system-prompt`, `user-prompt`), stored beside the config

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use std::path::Path;

use crate::core::config::Config;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub config: &'a mut Config,
    pub config_path: &'a Path,
}

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the words after the key. Returns a success message.
    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Clear the value. Returns a success message.
    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Whether the handler changed `config.toml` rather than a side file.
    fn writes_config(&self) -> bool {
        true
    }
}

/// Apply `aireports set <key> <value...>` and persist the result.
pub fn apply_set(
    registry: &SettingRegistry,
    key: &str,
    args: &[String],
    config_path: &Path,
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut config = Config::load_from_path(config_path)?;
    let message = handler.set(
        args,
        &mut SetContext {
            config: &mut config,
            config_path,
        },
    )?;
    if handler.writes_config() {
        config.save_to_path(config_path)?;
    }
    Ok(message)
}

/// Apply `aireports unset <key>` and persist the result.
pub fn apply_unset(
    registry: &SettingRegistry,
    key: &str,
    config_path: &Path,
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut config = Config::load_from_path(config_path)?;
    let message = handler.unset(&mut SetContext {
        config: &mut config,
        config_path,
    })?;
    if handler.writes_config() {
        config.save_to_path(config_path)?;
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(input: &[&str]) -> Vec<String> {
        input.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn set_and_unset_round_trip_through_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let registry = SettingRegistry::new();

        let message = apply_set(&registry, "model", &words(&["report-model"]), &path)
            .expect("set model");
        assert_eq!(message, "✅ Set model to: report-model");
        apply_set(&registry, "max-tokens", &words(&["4096"]), &path).expect("set max-tokens");
        apply_set(&registry, "detailed-logging", &words(&["on"]), &path).expect("set flag");

        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.model.as_deref(), Some("report-model"));
        assert_eq!(config.max_tokens, Some(4096));
        assert_eq!(config.detailed_logging, Some(true));

        apply_unset(&registry, "max-tokens", &path).expect("unset");
        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.model.as_deref(), Some("report-model"));
    }

    #[test]
    fn unknown_key_is_rejected_without_touching_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let err = apply_set(&SettingRegistry::new(), "theme", &words(&["dark"]), &path)
            .expect_err("unknown key");
        assert!(matches!(err, SettingError::UnknownKey(key) if key == "theme"));
        assert!(!path.exists());
    }

    #[test]
    fn invalid_values_are_reported() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let registry = SettingRegistry::new();

        assert!(matches!(
            apply_set(&registry, "timeout-secs", &words(&["soon"]), &path),
            Err(SettingError::InvalidNumber { key: "timeout-secs", .. })
        ));
        assert!(matches!(
            apply_set(&registry, "detailed-logging", &words(&["maybe"]), &path),
            Err(SettingError::InvalidBoolean(_))
        ));
        assert!(matches!(
            apply_set(&registry, "api-key", &[], &path),
            Err(SettingError::MissingArgs { .. })
        ));
    }

    #[test]
    fn prompts_are_written_beside_the_config() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let registry = SettingRegistry::new();

        apply_set(
            &registry,
            "system-prompt",
            &words(&["You", "write", "reports."]),
            &path,
        )
        .expect("set prompt");
        assert_eq!(
            Config::read_system_prompt(&path).expect("read"),
            "You write reports."
        );
        assert!(!path.exists());

        apply_unset(&registry, "system-prompt", &path).expect("unset prompt");
        assert_eq!(Config::read_system_prompt(&path).expect("read"), "");
    }
}
