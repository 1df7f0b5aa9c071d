//! `pitwall simulate` — Run a stint-plan simulation offline.

use clap::Args;
use pitwall_strategy::{LapTrace, StrategyInput, StrategyResult, StrategySimulator};

#[derive(Args)]
pub struct SimulateArgs {
    /// Race distance in laps
    #[arg(long)]
    pub laps: Option<i64>,

    /// Laps per stint, comma separated (e.g. 20,18,19)
    #[arg(long, value_delimiter = ',')]
    pub stints: Vec<i64>,

    #[arg(long)]
    pub base_lap_time: Option<f64>,

    #[arg(long)]
    pub fuel_per_lap: Option<f64>,

    #[arg(long)]
    pub tank_size: Option<f64>,

    #[arg(long)]
    pub pit_loss: Option<f64>,

    /// Seconds lost per lap of tyre age
    #[arg(long)]
    pub degradation: Option<f64>,

    /// Lap run under the safety car
    #[arg(long)]
    pub safety_car_lap: Option<i64>,

    /// Subtracted from the safety-car lap time (negative slows the lap)
    #[arg(long, allow_hyphen_values = true)]
    pub safety_car_delta: Option<f64>,

    /// Print every lap
    #[arg(long)]
    pub trace: bool,

    /// Print result and trace as JSON
    #[arg(long)]
    pub json: bool,
}

impl SimulateArgs {
    pub fn to_input(&self) -> StrategyInput {
        StrategyInput {
            laps: self.laps,
            base_lap_time: self.base_lap_time,
            fuel_per_lap: self.fuel_per_lap,
            tank_size: self.tank_size,
            pit_loss: self.pit_loss,
            tire_degradation_per_lap: self.degradation,
            stint_plan: (!self.stints.is_empty()).then(|| self.stints.clone()),
            safety_car_lap: self.safety_car_lap,
            safety_car_delta: self.safety_car_delta,
        }
    }
}

pub async fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let simulator = StrategySimulator::new(config.strategy);
    let input = args.to_input();

    let result = simulator.simulate(&input);
    let trace = simulator.trace(&input);

    if args.json {
        let out = serde_json::json!({ "result": result, "trace": trace });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_result(&result));
        if args.trace {
            print!("{}", render_trace(&trace));
        }
    }

    Ok(())
}

pub fn render_result(result: &StrategyResult) -> String {
    format!(
        "Feasible:   {}\nTotal time: {:.3}s\nPit stops:  {}\nAssumed:    {}\n",
        if result.feasible { "yes" } else { "no" },
        result.total_time,
        result.pits,
        result.assumptions.describe()
    )
}

pub fn render_trace(trace: &LapTrace) -> String {
    let mut out = String::from("\n  lap      time    fuel\n");
    for (i, (time, fuel)) in trace.lap_times.iter().zip(&trace.fuel_level).enumerate() {
        let lap = i as i64 + 1;
        out.push_str(&format!("{lap:>5} {time:>9.3} {fuel:>7.2}\n"));
        if trace.pit_laps.contains(&lap) {
            out.push_str("  --- pit ---\n");
        }
    }
    out
}
