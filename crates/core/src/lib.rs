//! # Pitwall Core
//!
//! Domain types, collaborator traits, and error definitions for the Pitwall
//! race-team assistant. This crate has **no framework dependencies**: it
//! defines the vocabulary every other crate speaks.
//!
//! ## Collaborators
//!
//! Pitwall treats two things as opaque collaborators and models each as a trait:
//! - [`Provider`]: a text-completion backend that turns role-tagged messages into a reply
//! - [`SessionStore`]: a durable key/value store namespaced per session

pub mod error;
pub mod message;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StoreError};
pub use message::{Message, Role, SessionKey};
pub use provider::{Provider, ProviderRequest, ProviderResponse, coerce_reply};
pub use store::SessionStore;
