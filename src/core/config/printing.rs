use crate::core::config::data::Config;
use crate::core::config::defaults::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};

impl Config {
    pub fn print_all(&self) {
        for line in self.display_lines() {
            println!("{line}");
        }
    }

    pub(crate) fn display_lines(&self) -> Vec<String> {
        let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "(unset)".into());
        vec![
            "Current configuration:".to_string(),
            format!("  base-url: {}", or_unset(&self.base_url)),
            format!("  endpoint: {}", or_unset(&self.endpoint)),
            format!("  api-key: {}", mask_key(self.api_key.as_deref())),
            format!("  model: {}", or_unset(&self.model)),
            format!(
                "  max-tokens: {}",
                self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
            ),
            format!(
                "  timeout-secs: {}",
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
            ),
            format!(
                "  max-retries: {}",
                self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
            ),
            match self.detailed_logging.unwrap_or(false) {
                true => "  detailed-logging: on".to_string(),
                false => "  detailed-logging: off".to_string(),
            },
        ]
    }
}

/// Show only the last four characters of a credential.
fn mask_key(key: Option<&str>) -> String {
    match key {
        None | Some("") => "(unset)".to_string(),
        Some(key) => {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 4 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{tail}")
            }
        }
    }
}
