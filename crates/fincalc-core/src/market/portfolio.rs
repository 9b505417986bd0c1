use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FinCalcError;
use crate::market::provider::{normalize_symbol, Interval, MarketDataProvider};
use crate::market::statistics;
use crate::types::{
    format_money, pct_to_rate, rate_to_pct, round_money, round_ratio, with_metadata,
    ComputationOutput, Money, Percent,
};
use crate::validation;
use crate::FinCalcResult;

/// Monthly closes kept per asset.
pub const LOOKBACK_MONTHS: usize = 60;
/// Weight resolution of the search grid (1/20 = 5%).
pub const GRID_STEPS: u32 = 20;
pub const MIN_ASSETS: usize = 2;
pub const MAX_ASSETS: usize = 10;

/// One-tailed 95% z-score.
const VAR_Z_95: Decimal = dec!(-1.645);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const RETURN_TOLERANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub symbols: Vec<String>,
    /// Minimum acceptable annualized return, as a percentage
    pub target_return: Percent,
    #[serde(default)]
    pub risk_free_rate: Percent,
    #[serde(default)]
    pub investment_amount: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub symbol: String,
    /// Fraction of the portfolio, a multiple of 0.05
    pub weight: Decimal,
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetStatistics {
    pub symbol: String,
    pub mean_monthly_return: Percent,
    pub annualized_return: Percent,
    pub annualized_volatility: Percent,
    pub observations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOutput {
    pub allocations: Vec<Allocation>,
    pub expected_return: Percent,
    pub volatility: Percent,
    /// `None` when the chosen portfolio has zero volatility
    pub sharpe_ratio: Option<Decimal>,
    /// 95% parametric VaR as a percentage of the portfolio
    pub value_at_risk_pct: Percent,
    pub value_at_risk: Option<Money>,
    /// False when no grid allocation reached the target and equal weights were used
    pub target_met: bool,
    pub grid_points_evaluated: u64,
    pub asset_statistics: Vec<AssetStatistics>,
    /// Sample covariance of monthly returns
    pub covariance_matrix: Vec<Vec<Decimal>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Minimum-volatility allocation that meets a target annual return.
///
/// Weights are searched exhaustively on a 5% grid. Monthly closes for every
/// symbol are fetched in parallel; any single failure fails the call.
pub fn optimize_portfolio(
    provider: &dyn MarketDataProvider,
    input: &PortfolioInput,
) -> FinCalcResult<ComputationOutput<PortfolioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let symbols = validate_input(input)?;

    let histories = fetch_monthly_closes(provider, &symbols)?;
    for (symbol, history) in symbols.iter().zip(&histories) {
        if history.fetched < LOOKBACK_MONTHS {
            warnings.push(format!(
                "{symbol}: only {} monthly closes available; padded to {LOOKBACK_MONTHS} with the earliest close.",
                history.fetched
            ));
        }
    }

    let returns = histories
        .iter()
        .map(|h| statistics::period_returns(&h.closes))
        .collect::<FinCalcResult<Vec<_>>>()?;
    let means: Vec<Decimal> = returns
        .iter()
        .map(|r| statistics::mean(r).unwrap_or(Decimal::ZERO))
        .collect();
    let covariance = statistics::sample_covariance(&returns)?;

    let target = pct_to_rate(input.target_return);
    let search = search_grid(&to_f64_vec(&means), &to_f64_matrix(&covariance), to_f64(target));
    info!(
        assets = symbols.len(),
        grid_points = search.evaluated,
        target_met = search.best.is_some(),
        "portfolio grid search complete"
    );

    let (weights, target_met) = match search.best {
        Some(counts) => (
            counts
                .iter()
                .map(|&c| Decimal::from(c) / Decimal::from(GRID_STEPS))
                .collect::<Vec<_>>(),
            true,
        ),
        None => {
            warn!(
                target_return = %input.target_return,
                "no allocation meets target; using equal weights"
            );
            warnings.push(format!(
                "No allocation reaches the {}% target return; falling back to equal weights.",
                input.target_return
            ));
            let equal = Decimal::ONE / Decimal::from(symbols.len());
            (vec![equal; symbols.len()], false)
        }
    };

    // Final metrics in Decimal
    let monthly_return: Decimal = weights.iter().zip(&means).map(|(w, m)| w * m).sum();
    let annual_return = monthly_return * MONTHS_PER_YEAR;
    let annual_vol = annualized_volatility(portfolio_variance(&weights, &covariance))?;
    let rf = pct_to_rate(input.risk_free_rate);

    let sharpe_ratio = if annual_vol.is_zero() {
        warnings.push("Portfolio volatility is zero; Sharpe ratio is undefined.".into());
        None
    } else {
        Some(round_ratio((annual_return - rf) / annual_vol))
    };

    let var_rate = annual_return + VAR_Z_95 * annual_vol;
    let value_at_risk = input.investment_amount.map(|amount| round_money(amount * var_rate));

    let allocations = symbols
        .iter()
        .zip(&weights)
        .map(|(symbol, &weight)| Allocation {
            symbol: symbol.clone(),
            weight: round_ratio(weight),
            amount: input.investment_amount.map(|amount| round_money(amount * weight)),
        })
        .collect();

    let asset_statistics = symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            Ok(AssetStatistics {
                symbol: symbol.clone(),
                mean_monthly_return: round_ratio(rate_to_pct(means[i])),
                annualized_return: round_ratio(rate_to_pct(means[i] * MONTHS_PER_YEAR)),
                annualized_volatility: round_ratio(rate_to_pct(annualized_volatility(
                    covariance[i][i],
                )?)),
                observations: histories[i].fetched,
            })
        })
        .collect::<FinCalcResult<Vec<_>>>()?;

    let output = PortfolioOutput {
        allocations,
        expected_return: round_ratio(rate_to_pct(annual_return)),
        volatility: round_ratio(rate_to_pct(annual_vol)),
        sharpe_ratio,
        value_at_risk_pct: round_ratio(rate_to_pct(var_rate)),
        value_at_risk,
        target_met,
        grid_points_evaluated: search.evaluated,
        asset_statistics,
        covariance_matrix: covariance
            .iter()
            .map(|row| row.iter().map(|c| c.round_dp(8)).collect())
            .collect(),
    };

    let mut message = format!(
        "Expected return {:.2}% with {:.2}% volatility across {} assets.",
        rate_to_pct(annual_return),
        rate_to_pct(annual_vol),
        symbols.len(),
    );
    if let Some(var) = value_at_risk {
        message.push_str(&format!(" 95% one-year VaR: {}.", format_money(var)));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Minimum-Variance Grid Search (5% weight steps, sample covariance of monthly returns)",
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

struct MonthlyHistory {
    /// Exactly LOOKBACK_MONTHS closes, oldest first
    closes: Vec<Decimal>,
    fetched: usize,
}

struct GridSearch {
    /// Weight counts (out of GRID_STEPS) of the best allocation found
    best: Option<Vec<u32>>,
    evaluated: u64,
}

struct Frame {
    asset: usize,
    remaining: u32,
    next: u32,
}

fn validate_input(input: &PortfolioInput) -> FinCalcResult<Vec<String>> {
    let count = input.symbols.len();
    if !(MIN_ASSETS..=MAX_ASSETS).contains(&count) {
        return Err(FinCalcError::invalid(
            "symbols",
            format!("must list between {MIN_ASSETS} and {MAX_ASSETS} symbols, got {count}"),
        ));
    }
    let symbols = input
        .symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .collect::<FinCalcResult<Vec<_>>>()?;
    if let Some(dup) = first_duplicate(&symbols) {
        return Err(FinCalcError::invalid(
            "symbols",
            format!("'{dup}' is listed more than once"),
        ));
    }

    if input.target_return <= dec!(-100) {
        return Err(FinCalcError::invalid(
            "target_return",
            "must be greater than -100%",
        ));
    }
    validation::percentage("risk_free_rate", input.risk_free_rate)?;
    if let Some(amount) = input.investment_amount {
        validation::positive("investment_amount", amount)?;
    }
    Ok(symbols)
}

fn first_duplicate(symbols: &[String]) -> Option<String> {
    let mut seen = HashSet::new();
    symbols.iter().find(|s| !seen.insert(s.as_str())).cloned()
}

fn fetch_monthly_closes(
    provider: &dyn MarketDataProvider,
    symbols: &[String],
) -> FinCalcResult<Vec<MonthlyHistory>> {
    symbols
        .par_iter()
        .map(|symbol| {
            let series = provider.price_series(symbol, Interval::Monthly)?;
            debug!(symbol = %symbol, points = series.len(), "fetched monthly series");
            if series.len() < 2 {
                return Err(FinCalcError::InsufficientData(format!(
                    "{symbol}: at least 2 monthly closes are needed, got {}",
                    series.len()
                )));
            }
            let closes: Vec<Decimal> = series.iter().map(|p| p.close).collect();
            Ok(MonthlyHistory {
                closes: align_to_lookback(&closes),
                fetched: closes.len().min(LOOKBACK_MONTHS),
            })
        })
        .collect()
}

/// Keep the latest LOOKBACK_MONTHS closes; left-pad shorter series with the
/// earliest close.
fn align_to_lookback(closes: &[Decimal]) -> Vec<Decimal> {
    let tail = &closes[closes.len().saturating_sub(LOOKBACK_MONTHS)..];
    let mut aligned = Vec::with_capacity(LOOKBACK_MONTHS);
    if let Some(&first) = tail.first() {
        aligned.resize(LOOKBACK_MONTHS - tail.len(), first);
    }
    aligned.extend_from_slice(tail);
    aligned
}

/// Enumerate every allocation of GRID_STEPS units over the assets and keep
/// the lowest-variance one whose annualized return meets `target`.
///
/// Depth-first with an explicit stack; candidates are visited with the first
/// asset's weight ascending and ties keep the earlier candidate.
fn search_grid(means: &[f64], cov: &[Vec<f64>], target: f64) -> GridSearch {
    let n = means.len();
    let last = n - 1;
    let step = 1.0 / f64::from(GRID_STEPS);
    let mut counts = vec![0u32; n];
    let mut weights = vec![0.0f64; n];
    let mut best: Option<(Vec<u32>, f64)> = None;
    let mut evaluated = 0u64;

    let mut stack = vec![Frame {
        asset: 0,
        remaining: GRID_STEPS,
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.asset == last {
            counts[last] = frame.remaining;
            stack.pop();
            evaluated += 1;

            for (w, &c) in weights.iter_mut().zip(&counts) {
                *w = f64::from(c) * step;
            }
            let annual: f64 = weights.iter().zip(means).map(|(w, m)| w * m).sum::<f64>() * 12.0;
            if annual + RETURN_TOLERANCE < target {
                continue;
            }
            let mut variance = 0.0;
            for i in 0..n {
                if weights[i] == 0.0 {
                    continue;
                }
                for j in 0..n {
                    variance += weights[i] * weights[j] * cov[i][j];
                }
            }
            if best.as_ref().map_or(true, |(_, v)| variance < *v) {
                best = Some((counts.clone(), variance));
            }
            continue;
        }

        if frame.next > frame.remaining {
            stack.pop();
            continue;
        }
        let units = frame.next;
        frame.next += 1;
        counts[frame.asset] = units;
        let child = Frame {
            asset: frame.asset + 1,
            remaining: frame.remaining - units,
            next: 0,
        };
        stack.push(child);
    }

    GridSearch {
        best: best.map(|(c, _)| c),
        evaluated,
    }
}

fn portfolio_variance(weights: &[Decimal], cov: &[Vec<Decimal>]) -> Decimal {
    let mut variance = Decimal::ZERO;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            variance += wi * wj * cov[i][j];
        }
    }
    variance.max(Decimal::ZERO)
}

/// Monthly variance to annualized standard deviation: sqrt(var) x sqrt(12).
fn annualized_volatility(monthly_variance: Decimal) -> FinCalcResult<Decimal> {
    let sqrt = |v: Decimal| {
        v.max(Decimal::ZERO)
            .sqrt()
            .ok_or_else(|| FinCalcError::DomainViolation(format!("square root of {v}")))
    };
    Ok(sqrt(monthly_variance)? * sqrt(MONTHS_PER_YEAR)?)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn to_f64_vec(values: &[Decimal]) -> Vec<f64> {
    values.iter().copied().map(to_f64).collect()
}

fn to_f64_matrix(matrix: &[Vec<Decimal>]) -> Vec<Vec<f64>> {
    matrix.iter().map(|row| to_f64_vec(row)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
