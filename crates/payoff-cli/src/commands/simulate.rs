use clap::Args;
use serde_json::Value;

use payoff_core::schedule::{self, SimulationInput};

use crate::input;

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Omit the per-period schedule from the output, keeping only totals
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for payoff simulation".into());
    };

    let result = schedule::simulate_payoff(&sim_input)?;
    let mut value = serde_json::to_value(result)?;

    if args.summary_only {
        if let Some(periods) = value
            .get_mut("result")
            .and_then(|r| r.get_mut("PaidOff"))
            .and_then(|p| p.as_object_mut())
        {
            periods.remove("periods");
        }
    }

    Ok(value)
}
