use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::error::FinCalcError;
use crate::market::provider::{normalize_symbol, Fundamentals, Interval, MarketDataProvider};
use crate::market::statistics;
use crate::types::{
    format_money, rate_to_pct, round_money, round_ratio, with_metadata, ComputationOutput, Money,
    Percent,
};
use crate::FinCalcResult;

/// Look-back for the RSI momentum reading.
pub const RSI_PERIOD: usize = 14;

/// Weekly closes below this count produce a thin-history warning.
const FULL_YEAR_WEEKS: usize = 52;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    LongTerm,
    ShortTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysisInput {
    pub symbol: String,
    pub horizon: Horizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiSignal {
    Bearish,
    Downtrend,
    Uptrend,
    Bullish,
}

impl RsiSignal {
    pub fn classify(rsi: Decimal) -> Self {
        if rsi <= dec!(30) {
            RsiSignal::Bearish
        } else if rsi < dec!(50) {
            RsiSignal::Downtrend
        } else if rsi < dec!(70) {
            RsiSignal::Uptrend
        } else {
            RsiSignal::Bullish
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysisOutput {
    pub symbol: String,
    pub horizon: Horizon,
    pub recommendation: Recommendation,
    pub current_price: Money,
    /// Mean of the weekly closes
    pub intrinsic_value: Money,
    /// (intrinsic - current) / current, as a percentage
    pub intrinsic_gap_pct: Percent,
    pub rsi: Decimal,
    pub rsi_signal: RsiSignal,
    /// Present only for short-term analysis
    pub fundamentals: Option<Fundamentals>,
    pub weekly_observations: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rate a stock from its weekly price history.
///
/// Long-term calls compare the price to the mean weekly close. Short-term
/// calls screen on P/E and P/B. Both report RSI(14) momentum.
pub fn analyze_stock(
    provider: &dyn MarketDataProvider,
    input: &StockAnalysisInput,
) -> FinCalcResult<ComputationOutput<StockAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let symbol = normalize_symbol(&input.symbol)?;

    let series = provider.price_series(&symbol, Interval::Weekly)?;
    debug!(symbol = %symbol, points = series.len(), "fetched weekly series");
    if series.len() < RSI_PERIOD + 1 {
        return Err(FinCalcError::InsufficientData(format!(
            "{symbol}: stock analysis needs at least {} weekly closes, got {}",
            RSI_PERIOD + 1,
            series.len()
        )));
    }
    if series.len() < FULL_YEAR_WEEKS {
        warnings.push(format!(
            "Intrinsic value averages only {} weekly closes (less than a year of history).",
            series.len()
        ));
    }

    let closes: Vec<Decimal> = series.iter().map(|p| p.close).collect();
    let intrinsic_value = statistics::mean(&closes)
        .ok_or_else(|| FinCalcError::InsufficientData(format!("{symbol}: empty series")))?;
    let rsi = statistics::rsi(&closes, RSI_PERIOD)?;
    let rsi_signal = RsiSignal::classify(rsi);

    let quote = provider.quote(&symbol)?;
    let current_price = quote.current_price;
    if current_price <= Decimal::ZERO {
        return Err(FinCalcError::DataUnavailable {
            symbol: symbol.clone(),
            reason: format!("quote returned non-positive price {current_price}"),
        });
    }

    let (recommendation, fundamentals) = match input.horizon {
        Horizon::LongTerm => (long_term_call(intrinsic_value, current_price), None),
        Horizon::ShortTerm => {
            let f = provider.fundamentals(&symbol)?;
            debug!(
                symbol = %symbol,
                pe = %f.pe_ratio,
                pb = %f.price_to_book_ratio,
                "fetched fundamentals"
            );
            if f.pe_ratio < Decimal::ZERO {
                warnings.push("Negative P/E (loss-making company); valuation screen holds.".into());
            }
            (short_term_call(&f), Some(f))
        }
    };

    let gap = (intrinsic_value - current_price) / current_price;

    let output = StockAnalysisOutput {
        symbol: symbol.clone(),
        horizon: input.horizon,
        recommendation,
        current_price: round_money(current_price),
        intrinsic_value: round_money(intrinsic_value),
        intrinsic_gap_pct: round_ratio(rate_to_pct(gap)),
        rsi: rsi.round_dp(2),
        rsi_signal,
        fundamentals,
        weekly_observations: series.len(),
    };

    let message = format!(
        "{symbol}: {recommendation} at {} (average weekly close {}, RSI {:.2} {:?}).",
        format_money(current_price),
        format_money(intrinsic_value),
        rsi,
        rsi_signal,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Stock Analysis (mean-close intrinsic value, RSI(14), P/E and P/B screen)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn long_term_call(intrinsic_value: Money, current_price: Money) -> Recommendation {
    if intrinsic_value > current_price {
        Recommendation::StrongBuy
    } else {
        Recommendation::StrongSell
    }
}

fn short_term_call(f: &Fundamentals) -> Recommendation {
    if f.pe_ratio < dec!(15) && f.price_to_book_ratio < dec!(1.5) {
        Recommendation::Buy
    } else if f.pe_ratio > dec!(25) && f.price_to_book_ratio > dec!(3.0) {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
