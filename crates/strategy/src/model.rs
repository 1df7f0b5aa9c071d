//! Strategy inputs and outputs.

use serde::{Deserialize, Serialize};

/// Simulation request. Every field may be omitted and falls back to the
/// simulator's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_lap_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_per_lap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tire_degradation_per_lap: Option<f64>,
    /// Laps per stint; absent or empty means one stint covering the race
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stint_plan: Option<Vec<i64>>,
    /// Global lap number (1-based) run under the safety car
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_car_lap: Option<i64>,
    /// Subtracted from the safety-car lap's time; negative slows the lap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_car_delta: Option<f64>,
}

/// The fully resolved parameters a simulation actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub laps: i64,
    pub base_lap_time: f64,
    pub fuel_per_lap: f64,
    pub tank_size: f64,
    pub pit_loss: f64,
    pub tire_degradation_per_lap: f64,
    pub stint_plan: Vec<i64>,
    pub safety_car_lap: Option<i64>,
    pub safety_car_delta: f64,
}

impl Assumptions {
    /// Laps the walk actually drives: the sum of the non-negative stints.
    pub fn simulated_laps(&self) -> i64 {
        self.stint_plan
            .iter()
            .fold(0i64, |total, &stint| total.saturating_add(stint.max(0)))
    }

    /// Compact one-line parameter echo.
    pub fn describe(&self) -> String {
        let stints: Vec<String> = self.stint_plan.iter().map(|s| s.to_string()).collect();
        let sc = self
            .safety_car_lap
            .map(|lap| format!("lap {lap} ({:+})", self.safety_car_delta))
            .unwrap_or_else(|| "none".into());
        format!(
            "laps={} base={}s fuel/lap={} tank={} pitLoss={}s deg/lap={}s stints=[{}] SC={}",
            self.laps,
            self.base_lap_time,
            self.fuel_per_lap,
            self.tank_size,
            self.pit_loss,
            self.tire_degradation_per_lap,
            stints.join(","),
            sc
        )
    }
}

/// Outcome of one simulation. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub feasible: bool,
    /// Seconds, rounded to three decimals
    pub total_time: f64,
    pub pits: u32,
    pub assumptions: Assumptions,
}

/// Lap-by-lap series for charting a simulated race.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapTrace {
    pub lap_times: Vec<f64>,
    /// Fuel left after each lap, never below zero
    pub fuel_level: Vec<f64>,
    /// Global lap count after which each stop happened
    pub pit_laps: Vec<i64>,
}
