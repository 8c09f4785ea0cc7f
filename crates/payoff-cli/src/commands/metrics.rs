use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::metrics::{self, DscrInput};

use crate::input;

/// Arguments for DSCR calculation
#[derive(Args)]
pub struct DscrArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net operating income over the measurement period
    #[arg(long, alias = "noi")]
    pub net_operating_income: Option<Decimal>,

    /// Required debt service over the same period
    #[arg(long)]
    pub debt_service: Option<Decimal>,
}

pub fn run_dscr(args: DscrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dscr_input: DscrInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        DscrInput {
            net_operating_income: args
                .net_operating_income
                .ok_or("--net-operating-income is required (or provide --input)")?,
            debt_service: args
                .debt_service
                .ok_or("--debt-service is required (or provide --input)")?,
        }
    };

    let result = metrics::assess_dscr(&dscr_input)?;
    Ok(serde_json::to_value(result)?)
}
