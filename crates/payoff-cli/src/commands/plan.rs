use clap::Args;
use serde_json::Value;

use payoff_core::strategy::{self, PlanInput};

use crate::input;

#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: PlanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a payoff plan".into());
    };

    let result = strategy::plan_payoff(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}
