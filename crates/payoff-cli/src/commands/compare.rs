use clap::Args;
use serde_json::Value;

use payoff_core::comparison::{self, ComparisonInput};

use crate::input;

#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (one of the ComparisonInput variants)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cmp_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a comparison".into());
    };

    let result = comparison::analyze_comparison(&cmp_input)?;
    Ok(serde_json::to_value(result)?)
}
