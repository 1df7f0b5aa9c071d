pub mod analyze;
pub mod chat;
pub mod init;
pub mod serve;
pub mod simulate;

use pitwall_config::AppConfig;
use pitwall_core::provider::Provider;
use std::sync::Arc;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = pitwall_providers::router::build_from_config(config);
    Ok(router.default().ok_or("No default provider configured")?)
}
