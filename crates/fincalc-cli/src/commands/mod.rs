pub mod business;
pub mod fixed_income;
pub mod growth;
pub mod household;
pub mod lending;
pub mod market;

use clap::Args;
use serde_json::Value;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Arguments shared by every calculator
#[derive(Args)]
pub struct InputArgs {
    /// Path to JSON or YAML input file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for calculators that read prices
#[derive(Args)]
pub struct MarketArgs {
    /// Path to JSON or YAML input file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a market data snapshot: {"symbols": {"AAPL": {...}}}
    #[arg(long)]
    pub market_data: String,
}
