//! Inference provider implementations for Pitwall.
//!
//! All providers implement the `pitwall_core::Provider` trait.
//! The router selects the correct provider based on configuration.

mod http;
pub mod openai_compat;
pub mod router;
pub mod workers_ai;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
pub use workers_ai::WorkersAiProvider;
