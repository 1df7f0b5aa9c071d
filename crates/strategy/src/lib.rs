//! Stint-based race strategy simulation.
//!
//! Given a lap count, a stint plan and a handful of car parameters, the
//! simulator walks the race lap by lap and reports total time, pit count and
//! whether the plan is feasible. It is pure: the same input always produces
//! the same output, down to the bit.
//!
//! Infeasibility is reported, never repaired. A stint that burns more fuel
//! than the tank holds, or a plan whose stints do not add up to the race
//! distance, still runs to completion with `feasible = false`.

pub mod model;
pub mod simulator;

pub use model::{Assumptions, LapTrace, StrategyInput, StrategyResult};
pub use simulator::StrategySimulator;
