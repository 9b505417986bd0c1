use fincalc_core::market::portfolio::{self, PortfolioInput};
use fincalc_core::market::stock_analysis::{self, StockAnalysisInput};
use fincalc_core::market::StaticMarketData;
use tracing::debug;

use super::{CommandResult, MarketArgs};
use crate::input;

fn load_market_data(path: &str) -> Result<StaticMarketData, Box<dyn std::error::Error>> {
    let contents = input::file::read_text(path)?;
    let data = StaticMarketData::from_json(&contents)?;
    debug!(path, symbols = data.symbols().count(), "loaded market data snapshot");
    Ok(data)
}

pub fn run_stock_analysis(args: MarketArgs) -> CommandResult {
    let stock_input: StockAnalysisInput = input::load(args.input.as_deref(), "stock analysis")?;
    let provider = load_market_data(&args.market_data)?;
    let result = stock_analysis::analyze_stock(&provider, &stock_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_portfolio_optimization(args: MarketArgs) -> CommandResult {
    let portfolio_input: PortfolioInput =
        input::load(args.input.as_deref(), "portfolio optimization")?;
    let provider = load_market_data(&args.market_data)?;
    let result = portfolio::optimize_portfolio(&provider, &portfolio_input)?;
    Ok(serde_json::to_value(result)?)
}
