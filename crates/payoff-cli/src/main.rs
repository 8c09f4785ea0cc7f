mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::compare::CompareArgs;
use commands::metrics::DscrArgs;
use commands::payment::PaymentArgs;
use commands::plan::PlanArgs;
use commands::simulate::SimulateArgs;

/// Amortisation and debt payoff calculations
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Amortisation and debt payoff calculations",
    long_about = "A CLI for fixed-rate amortisation and iterative payoff \
                  calculations with decimal precision. Supports closed-form \
                  payment calculation, payoff simulation over stepped rates, \
                  avalanche/snowball multi-debt plans, extra-payment and \
                  balance-transfer comparisons, and DSCR."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Closed-form fixed payment for a level-pay loan
    Payment(PaymentArgs),
    /// Simulate a payoff period by period over stepped rates
    Simulate(SimulateArgs),
    /// Multi-debt avalanche/snowball payoff plan
    Plan(PlanArgs),
    /// Extra-payment, balance-transfer and refinance comparisons
    Compare(CompareArgs),
    /// Debt service coverage ratio
    Dscr(DscrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Dscr(args) => commands::metrics::run_dscr(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
