//! The analytical context a session carries between chat turns.

use pitwall_strategy::{StrategyInput, StrategyResult};
use pitwall_telemetry::TelemetryDigest;
use serde::{Deserialize, Serialize};

/// What a session remembers about its latest strategy simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDigest {
    /// The request as the operator sent it
    pub params: StrategyInput,
    pub result: StrategyResult,
    #[serde(default)]
    pub commentary: String,
}

/// Latest analysis results attached to a session.
///
/// Each field is replaced wholesale by [`SessionContext::merge`]; nothing
/// inside a digest is ever merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyDigest>,
}

impl SessionContext {
    pub fn with_telemetry(digest: TelemetryDigest) -> Self {
        Self {
            telemetry: Some(digest),
            strategy: None,
        }
    }

    pub fn with_strategy(digest: StrategyDigest) -> Self {
        Self {
            telemetry: None,
            strategy: Some(digest),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.telemetry.is_none() && self.strategy.is_none()
    }

    /// Overwrite every key that `partial` sets and keep the rest.
    pub fn merge(&mut self, partial: SessionContext) {
        if let Some(telemetry) = partial.telemetry {
            self.telemetry = Some(telemetry);
        }
        if let Some(strategy) = partial.strategy {
            self.strategy = Some(strategy);
        }
    }
}
