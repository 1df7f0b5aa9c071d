//! Provider router: selects the correct inference provider based on config.

use crate::openai_compat::OpenAiCompatProvider;
use crate::workers_ai::WorkersAiProvider;
use pitwall_config::{AppConfig, ProviderConfig};
use pitwall_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;

/// Holds the configured providers and knows which one is the default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build providers from configuration.
///
/// Every entry under `[providers]` is registered, and the default provider
/// is always present even when it has no section of its own.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        router.register(name.clone(), build_one(name, provider_config, config));
    }

    if router.get(&config.default_provider).is_none() {
        let empty = ProviderConfig {
            api_key: None,
            api_url: None,
            account_id: None,
            default_model: None,
        };
        router.register(
            config.default_provider.clone(),
            build_one(&config.default_provider, &empty, config),
        );
    }

    router
}

fn build_one(name: &str, pc: &ProviderConfig, config: &AppConfig) -> Arc<dyn Provider> {
    let api_key = pc
        .api_key
        .clone()
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    if name == "workers_ai" {
        let mut p = WorkersAiProvider::new(pc.account_id.clone().unwrap_or_default(), api_key);
        if let Some(url) = &pc.api_url {
            p = p.with_base_url(url);
        }
        return Arc::new(p);
    }

    let base_url = pc
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(name));
    Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
