//! Calculators that read prices through an injected [`MarketDataProvider`].
//!
//! The core never performs I/O itself. Callers hand in a provider; the
//! in-memory [`StaticMarketData`] covers snapshots loaded from JSON.

pub mod portfolio;
pub mod provider;
pub mod statistics;
pub mod stock_analysis;

pub use provider::{
    Fundamentals, Interval, MarketDataProvider, PricePoint, Quote, StaticMarketData, SymbolSnapshot,
};
