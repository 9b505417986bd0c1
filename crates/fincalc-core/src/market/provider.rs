use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::types::Money;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Sampling interval of a close-price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Weekly,
    Monthly,
}

impl Interval {
    pub fn label(self) -> &'static str {
        match self {
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Decimal,
    pub price_to_book_ratio: Decimal,
}

/// Source of prices and fundamentals for the market calculators.
///
/// Implementations report every failure as [`FinCalcError::DataUnavailable`].
/// Series are returned oldest first.
pub trait MarketDataProvider: Send + Sync {
    fn price_series(&self, symbol: &str, interval: Interval) -> FinCalcResult<Vec<PricePoint>>;
    fn quote(&self, symbol: &str) -> FinCalcResult<Quote>;
    fn fundamentals(&self, symbol: &str) -> FinCalcResult<Fundamentals>;
}

/// Everything a snapshot knows about one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub current_price: Money,
    #[serde(default)]
    pub pe_ratio: Option<Decimal>,
    #[serde(default)]
    pub price_to_book_ratio: Option<Decimal>,
    #[serde(default)]
    pub weekly: Vec<PricePoint>,
    #[serde(default)]
    pub monthly: Vec<PricePoint>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    symbols: BTreeMap<String, SymbolSnapshot>,
}

/// In-memory provider backed by a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    symbols: BTreeMap<String, SymbolSnapshot>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{"symbols": {"AAPL": {...}}}` snapshot document.
    pub fn from_json(json: &str) -> FinCalcResult<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let mut data = Self::new();
        for (symbol, snapshot) in file.symbols {
            data.insert(&symbol, snapshot)?;
        }
        Ok(data)
    }

    pub fn insert(&mut self, symbol: &str, snapshot: SymbolSnapshot) -> FinCalcResult<()> {
        let symbol = normalize_symbol(symbol)?;
        ensure_chronological(&symbol, Interval::Weekly, &snapshot.weekly)?;
        ensure_chronological(&symbol, Interval::Monthly, &snapshot.monthly)?;
        if snapshot.current_price <= Decimal::ZERO {
            return Err(FinCalcError::invalid(
                &format!("symbols.{symbol}.current_price"),
                "must be positive",
            ));
        }
        self.symbols.insert(symbol, snapshot);
        Ok(())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    fn lookup(&self, symbol: &str) -> FinCalcResult<&SymbolSnapshot> {
        let key = symbol.trim().to_uppercase();
        self.symbols
            .get(&key)
            .ok_or_else(|| unavailable(&key, "symbol not present in market data snapshot"))
    }
}

impl MarketDataProvider for StaticMarketData {
    fn price_series(&self, symbol: &str, interval: Interval) -> FinCalcResult<Vec<PricePoint>> {
        let snapshot = self.lookup(symbol)?;
        let series = match interval {
            Interval::Weekly => &snapshot.weekly,
            Interval::Monthly => &snapshot.monthly,
        };
        Ok(series.clone())
    }

    fn quote(&self, symbol: &str) -> FinCalcResult<Quote> {
        let snapshot = self.lookup(symbol)?;
        Ok(Quote {
            symbol: symbol.trim().to_uppercase(),
            current_price: snapshot.current_price,
        })
    }

    fn fundamentals(&self, symbol: &str) -> FinCalcResult<Fundamentals> {
        let snapshot = self.lookup(symbol)?;
        match (snapshot.pe_ratio, snapshot.price_to_book_ratio) {
            (Some(pe_ratio), Some(price_to_book_ratio)) => Ok(Fundamentals {
                pe_ratio,
                price_to_book_ratio,
            }),
            _ => Err(unavailable(
                &symbol.trim().to_uppercase(),
                "P/E and P/B ratios missing from snapshot",
            )),
        }
    }
}

/// Trim and upper-case a ticker, rejecting anything that is not a plausible
/// exchange symbol.
pub(crate) fn normalize_symbol(raw: &str) -> FinCalcResult<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(FinCalcError::invalid("symbol", "must not be empty"));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(FinCalcError::invalid(
            "symbol",
            format!("'{symbol}' contains characters not allowed in a ticker"),
        ));
    }
    Ok(symbol)
}

pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> FinCalcError {
    FinCalcError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn ensure_chronological(
    symbol: &str,
    interval: Interval,
    series: &[PricePoint],
) -> FinCalcResult<()> {
    for pair in series.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(FinCalcError::invalid(
                &format!("symbols.{symbol}.{}", interval.label()),
                format!(
                    "timestamps must be strictly increasing ({} follows {})",
                    pair[1].timestamp, pair[0].timestamp
                ),
            ));
        }
    }
    if let Some(point) = series.iter().find(|p| p.close <= Decimal::ZERO) {
        return Err(FinCalcError::invalid(
            &format!("symbols.{symbol}.{}", interval.label()),
            format!("close at {} must be positive", point.timestamp),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
