//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    api_key_handler, base_url_handler, detailed_logging_handler, endpoint_handler,
    max_retries_handler, max_tokens_handler, model_handler, timeout_handler, PromptHandler,
    PromptKind,
};
use super::SettingHandler;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for help output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(base_url_handler()));
        registry.register(Box::new(endpoint_handler()));
        registry.register(Box::new(api_key_handler()));
        registry.register(Box::new(model_handler()));
        registry.register(Box::new(max_tokens_handler()));
        registry.register(Box::new(timeout_handler()));
        registry.register(Box::new(max_retries_handler()));
        registry.register(Box::new(detailed_logging_handler()));
        registry.register(Box::new(PromptHandler::new(PromptKind::System)));
        registry.register(Box::new(PromptHandler::new(PromptKind::User)));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
