#![cfg(feature = "market")]

use std::sync::atomic::{AtomicUsize, Ordering};

use fincalc_core::market::portfolio::{optimize_portfolio, PortfolioInput};
use fincalc_core::market::stock_analysis::{analyze_stock, Horizon, StockAnalysisInput};
use fincalc_core::market::{
    Fundamentals, Interval, MarketDataProvider, PricePoint, Quote, StaticMarketData,
};
use fincalc_core::{FinCalcError, FinCalcResult};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Deterministic provider that synthesises a gently rising series for any
/// ticker except those in `down`, and counts calls.
struct SyntheticFeed {
    down: &'static [&'static str],
    calls: AtomicUsize,
}

impl SyntheticFeed {
    fn new(down: &'static [&'static str]) -> Self {
        Self {
            down,
            calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, symbol: &str) -> FinCalcResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.contains(&symbol) {
            return Err(FinCalcError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "feed offline".into(),
            });
        }
        Ok(())
    }
}

impl MarketDataProvider for SyntheticFeed {
    fn price_series(&self, symbol: &str, interval: Interval) -> FinCalcResult<Vec<PricePoint>> {
        self.check(symbol)?;
        let (count, step) = match interval {
            Interval::Weekly => (52, 604_800),
            Interval::Monthly => (60, 2_629_746),
        };
        let drift = Decimal::from(symbol.len() as u32);
        Ok((0..count)
            .map(|i| PricePoint {
                timestamp: chrono::DateTime::from_timestamp(1_600_000_000 + i * step, 0).unwrap(),
                close: dec!(50) + drift * Decimal::from(i) / dec!(10)
                    + if i % 3 == 0 { dec!(1) } else { Decimal::ZERO },
            })
            .collect())
    }

    fn quote(&self, symbol: &str) -> FinCalcResult<Quote> {
        self.check(symbol)?;
        Ok(Quote {
            symbol: symbol.to_string(),
            current_price: dec!(40),
        })
    }

    fn fundamentals(&self, symbol: &str) -> FinCalcResult<Fundamentals> {
        self.check(symbol)?;
        Ok(Fundamentals {
            pe_ratio: dec!(10),
            price_to_book_ratio: dec!(1.1),
        })
    }
}

#[test]
fn test_custom_provider_drives_stock_analysis() {
    let feed = SyntheticFeed::new(&[]);
    let input = StockAnalysisInput {
        symbol: "ab".into(),
        horizon: Horizon::ShortTerm,
    };
    let out = analyze_stock(&feed, &input).unwrap().result;
    assert_eq!(out.symbol, "AB");
    assert_eq!(out.recommendation.to_string(), "Buy");
    assert_eq!(out.weekly_observations, 52);
    assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_portfolio_fetches_each_symbol_once() {
    let feed = SyntheticFeed::new(&[]);
    let input = PortfolioInput {
        symbols: vec!["A".into(), "BB".into(), "CCC".into(), "DDDD".into()],
        target_return: dec!(0),
        risk_free_rate: dec!(0),
        investment_amount: None,
    };
    let out = optimize_portfolio(&feed, &input).unwrap().result;
    assert_eq!(feed.calls.load(Ordering::SeqCst), 4);
    // C(23, 3) grid points for four assets
    assert_eq!(out.grid_points_evaluated, 1771);
    let total: Decimal = out.allocations.iter().map(|a| a.weight).sum();
    assert_eq!(total, Decimal::ONE);
    assert!(out.value_at_risk.is_none());
}

#[test]
fn test_portfolio_surfaces_provider_failure() {
    let feed = SyntheticFeed::new(&["BAD"]);
    let input = PortfolioInput {
        symbols: vec!["GOOD".into(), "BAD".into(), "FINE".into()],
        target_return: dec!(5),
        risk_free_rate: dec!(1),
        investment_amount: Some(dec!(1000)),
    };
    match optimize_portfolio(&feed, &input).unwrap_err() {
        FinCalcError::DataUnavailable { symbol, reason } => {
            assert_eq!(symbol, "BAD");
            assert_eq!(reason, "feed offline");
        }
        other => panic!("Expected DataUnavailable, got {other:?}"),
    }
}

#[test]
fn test_static_snapshot_round_trip_through_json() {
    let json = r#"{"symbols": {"XYZ": {
        "current_price": "12.5",
        "pe_ratio": "30",
        "price_to_book_ratio": "4",
        "weekly": [{"timestamp": "2024-03-01T00:00:00Z", "close": "12"}]
    }}}"#;
    let data = StaticMarketData::from_json(json).unwrap();
    assert_eq!(data.symbols().collect::<Vec<_>>(), vec!["XYZ"]);
    assert_eq!(
        data.fundamentals("xyz").unwrap(),
        Fundamentals {
            pe_ratio: dec!(30),
            price_to_book_ratio: dec!(4),
        }
    );
    let err = analyze_stock(
        &data,
        &StockAnalysisInput {
            symbol: "XYZ".into(),
            horizon: Horizon::LongTerm,
        },
    )
    .unwrap_err();
    assert!(matches!(err, FinCalcError::InsufficientData(_)));
}
