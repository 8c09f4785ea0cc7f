use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::annuity::{self, LoanTerms};
use payoff_core::rates;

use crate::input;

/// Arguments for closed-form payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Rate per payment period as a decimal fraction (0.005 = 0.5%)
    #[arg(long)]
    pub periodic_rate: Option<Decimal>,

    /// Annual rate as a decimal fraction; divided by 12 when
    /// --periodic-rate is not given
    #[arg(long, alias = "apr")]
    pub annual_rate: Option<Decimal>,

    /// Number of payment periods
    #[arg(long, alias = "months")]
    pub periods: Option<u32>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        let periodic_rate = match (args.periodic_rate, args.annual_rate) {
            (Some(r), _) => r,
            (None, Some(apr)) => rates::periodic_from_annual(apr, 12)?,
            (None, None) => {
                return Err("--periodic-rate or --annual-rate is required (or provide --input)".into())
            }
        };
        LoanTerms {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            periodic_rate,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
        }
    };

    let result = annuity::analyze_payment(&terms)?;
    Ok(serde_json::to_value(result)?)
}
