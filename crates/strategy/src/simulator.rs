//! The lap-by-lap strategy walk.

use crate::model::{Assumptions, LapTrace, StrategyInput, StrategyResult};
use pitwall_config::StrategyConfig;
use tracing::debug;

/// One step of the race walk.
enum LapEvent {
    /// Stop between stints, after global lap `after_lap`
    Pit { after_lap: i64 },
    Lap { time: f64, fuel_burn: f64 },
}

/// Outcome of a walk before rounding.
struct Walk {
    feasible: bool,
    total_time: f64,
    pits: u32,
}

/// Simulates races against a fixed set of defaults.
#[derive(Debug, Clone, Default)]
pub struct StrategySimulator {
    defaults: StrategyConfig,
}

impl StrategySimulator {
    pub fn new(defaults: StrategyConfig) -> Self {
        Self { defaults }
    }

    /// Configured upper bound on race length.
    pub fn max_laps(&self) -> i64 {
        self.defaults.max_laps
    }

    /// Fill every omitted field from the defaults.
    pub fn resolve(&self, input: &StrategyInput) -> Assumptions {
        let d = &self.defaults;
        let laps = input.laps.unwrap_or(d.laps);
        let stint_plan = match &input.stint_plan {
            Some(plan) if !plan.is_empty() => plan.clone(),
            _ => vec![laps],
        };

        Assumptions {
            laps,
            base_lap_time: input.base_lap_time.unwrap_or(d.base_lap_time),
            fuel_per_lap: input.fuel_per_lap.unwrap_or(d.fuel_per_lap),
            tank_size: input.tank_size.unwrap_or(d.tank_size),
            pit_loss: input.pit_loss.unwrap_or(d.pit_loss),
            tire_degradation_per_lap: input
                .tire_degradation_per_lap
                .unwrap_or(d.tire_degradation_per_lap),
            stint_plan,
            safety_car_lap: input.safety_car_lap,
            safety_car_delta: input.safety_car_delta.unwrap_or(d.safety_car_delta),
        }
    }

    /// Run the simulation.
    pub fn simulate(&self, input: &StrategyInput) -> StrategyResult {
        let assumptions = self.resolve(input);
        let walk = walk(&assumptions, |_| {});
        let total_time = round3(walk.total_time);

        debug!(
            laps = assumptions.laps,
            stints = assumptions.stint_plan.len(),
            pits = walk.pits,
            feasible = walk.feasible,
            total_time,
            "Strategy simulated"
        );

        StrategyResult {
            feasible: walk.feasible,
            total_time,
            pits: walk.pits,
            assumptions,
        }
    }

    /// Per-lap times, fuel levels and stop positions for the same walk.
    ///
    /// Fuel starts at a full tank and refills to full at every stop.
    pub fn trace(&self, input: &StrategyInput) -> LapTrace {
        let assumptions = self.resolve(input);
        let mut trace = LapTrace::default();
        let mut fuel = assumptions.tank_size;

        walk(&assumptions, |event| match event {
            LapEvent::Pit { after_lap } => {
                trace.pit_laps.push(after_lap);
                fuel = assumptions.tank_size;
            }
            LapEvent::Lap { time, fuel_burn } => {
                fuel -= fuel_burn;
                trace.lap_times.push(time);
                trace.fuel_level.push(fuel.max(0.0));
            }
        });

        trace
    }
}

fn walk(a: &Assumptions, mut on_event: impl FnMut(LapEvent)) -> Walk {
    let mut lap_counter: i64 = 0;
    let mut total_time = 0.0;
    let mut pits = 0u32;
    let mut feasible = true;
    let last = a.stint_plan.len().saturating_sub(1);

    for (i, &stint_laps) in a.stint_plan.iter().enumerate() {
        if stint_laps as f64 * a.fuel_per_lap > a.tank_size {
            feasible = false;
        }

        for j in 0..stint_laps.max(0) {
            lap_counter += 1;
            // Degradation restarts with fresh tyres each stint.
            let mut lap_time = a.base_lap_time + a.tire_degradation_per_lap * j as f64;
            if a.safety_car_lap == Some(lap_counter) {
                lap_time -= a.safety_car_delta;
            }
            total_time += lap_time;
            on_event(LapEvent::Lap {
                time: lap_time,
                fuel_burn: a.fuel_per_lap,
            });
        }

        if i < last {
            total_time += a.pit_loss;
            pits += 1;
            on_event(LapEvent::Pit {
                after_lap: lap_counter,
            });
        }
    }

    if lap_counter != a.laps {
        feasible = false;
    }

    Walk {
        feasible,
        total_time,
        pits,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
