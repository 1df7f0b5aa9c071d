//! Session store implementations for Pitwall.
//!
//! All backends implement `pitwall_core::SessionStore`.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
