//! Model parameters shared by chat turns and briefing prompts.

use pitwall_config::AppConfig;
use pitwall_core::message::Message;
use pitwall_core::provider::ProviderRequest;

/// Which model to call and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.3,
            max_tokens: None,
        }
    }

    /// Take the model from the default provider's section when it names one.
    pub fn from_config(config: &AppConfig) -> Self {
        let model = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| config.default_model.clone());

        Self {
            model,
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
        }
    }

    pub fn request(&self, messages: Vec<Message>) -> ProviderRequest {
        let request = ProviderRequest::new(&self.model, messages).with_temperature(self.temperature);
        match self.max_tokens {
            Some(max) => request.with_max_tokens(max),
            None => request,
        }
    }
}
