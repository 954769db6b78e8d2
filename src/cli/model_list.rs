//! `aireports models`: list the models the configured credential can use.

use std::error::Error;
use std::path::Path;

use crate::api::models::{chat_models, sort_models};
use crate::api::ModelInfo;
use crate::core::config::Config;
use crate::core::transport::TransportSession;

pub async fn list_models(config_path: &Path, all: bool) -> Result<(), Box<dyn Error>> {
    let config = Config::load_from_path(config_path)?.with_env_overrides();
    let settings = config.api_settings()?;
    let session = TransportSession::new(&settings, config.timeout())?;

    let mut models = session.list_models().await?.data;
    if all {
        sort_models(&mut models);
    } else {
        models = chat_models(models);
    }

    println!("🤖 Available Models at {}", settings.base_url);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    for line in format_models(&models, config.model.as_deref(), all) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn format_models(models: &[ModelInfo], default: Option<&str>, all: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(default) = default {
        lines.push(format!("🎯 Default model: {default} (from config)"));
        lines.push(String::new());
    }

    if models.is_empty() {
        lines.push(if all {
            "No models found.".to_string()
        } else {
            "No chat models found. Use --all to see every model.".to_string()
        });
        return lines;
    }

    lines.push(format!("Found {} models:", models.len()));
    lines.push(String::new());

    for model in models {
        lines.push(format!("  • {}", model.id));
        if let Some(owned_by) = &model.owned_by {
            if !owned_by.is_empty() && owned_by != "system" {
                lines.push(format!("    Owner: {owned_by}"));
            }
        }
        if all {
            if let Some(mode) = &model.mode {
                lines.push(format!("    Mode: {mode}"));
            }
        }
        if let Some(pricing) = &model.pricing {
            lines.push(format!("    Price: {}", pricing.display_price()));
        }
        let (limit, output) = (model.max_tokens_or_zero(), model.max_output_tokens_or_zero());
        if limit > 0 || output > 0 {
            lines.push(format!("    Tokens: {limit} max, {output} out"));
        }
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PricingInfo;

    #[test]
    fn format_models_shows_owner_price_and_limits() {
        let models = vec![ModelInfo {
            id: "report-model".into(),
            owned_by: Some("acme".into()),
            mode: Some("chat".into()),
            pricing: Some(PricingInfo {
                input: 1.5,
                output: 2.0,
                ..Default::default()
            }),
            max_tokens: Some(128000.0),
            max_output_tokens: Some(16000.0),
            ..Default::default()
        }];

        let lines = format_models(&models, Some("report-model"), false);
        assert_eq!(lines[0], "🎯 Default model: report-model (from config)");
        assert!(lines.contains(&"Found 1 models:".to_string()));
        assert!(lines.contains(&"  • report-model".to_string()));
        assert!(lines.contains(&"    Owner: acme".to_string()));
        assert!(lines.contains(&"    Price: In: 1.50 | Out: 2.00".to_string()));
        assert!(lines.contains(&"    Tokens: 128000 max, 16000 out".to_string()));
        assert!(!lines.iter().any(|line| line.contains("Mode:")));
    }

    #[test]
    fn system_owner_is_hidden() {
        let models = vec![ModelInfo {
            id: "m".into(),
            owned_by: Some("system".into()),
            ..Default::default()
        }];
        let lines = format_models(&models, None, true);
        assert!(!lines.iter().any(|line| line.contains("Owner")));
    }

    #[test]
    fn empty_listing_points_at_all_flag() {
        let lines = format_models(&[], None, false);
        assert_eq!(lines, vec!["No chat models found. Use --all to see every model."]);
    }
}
