//! # Pitwall Sessions
//!
//! A session is one operator's conversation plus the latest analysis results
//! attached to it. Each session key gets exactly one [`SessionActor`], handed
//! out by the [`SessionRegistry`]; the actor serializes every operation on
//! that session and keeps its log bounded to `2 * max_turns` messages.
//!
//! Before each chat turn the actor renders the current [`SessionContext`]
//! into a short digest and places it between the system instruction and the
//! history (see [`prompt`]).

pub mod actor;
pub mod analyst;
pub mod context;
pub mod prompt;
pub mod registry;
pub mod settings;

#[cfg(test)]
mod test_helpers;

pub use actor::SessionActor;
pub use context::{SessionContext, StrategyDigest};
pub use registry::SessionRegistry;
pub use settings::ModelSettings;
