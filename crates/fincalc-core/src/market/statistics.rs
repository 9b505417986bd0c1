//! Descriptive statistics over close-price series.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Period-over-period simple returns, `close[t] / close[t-1] - 1`.
pub fn period_returns(closes: &[Decimal]) -> FinCalcResult<Vec<Decimal>> {
    closes
        .windows(2)
        .map(|pair| {
            if pair[0].is_zero() {
                return Err(FinCalcError::DivisionByZero {
                    context: "period return on a zero close".into(),
                });
            }
            Ok(pair[1] / pair[0] - Decimal::ONE)
        })
        .collect()
}

/// Sample covariance matrix (n - 1 denominator) of equal-length series.
pub fn sample_covariance(series: &[Vec<Decimal>]) -> FinCalcResult<Vec<Vec<Decimal>>> {
    let n = series.first().map(Vec::len).unwrap_or(0);
    if n < 2 {
        return Err(FinCalcError::InsufficientData(
            "covariance needs at least two observations per series".into(),
        ));
    }
    if series.iter().any(|s| s.len() != n) {
        return Err(FinCalcError::InsufficientData(
            "covariance needs series of equal length".into(),
        ));
    }

    let means: Vec<Decimal> = series
        .iter()
        .map(|s| mean(s).unwrap_or(Decimal::ZERO))
        .collect();
    let denominator = Decimal::from(n - 1);
    let k = series.len();
    let mut matrix = vec![vec![Decimal::ZERO; k]; k];

    for i in 0..k {
        for j in i..k {
            let sum: Decimal = series[i]
                .iter()
                .zip(&series[j])
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum();
            let cov = sum / denominator;
            matrix[i][j] = cov;
            matrix[j][i] = cov;
        }
    }
    Ok(matrix)
}

/// Relative Strength Index over the last `period` price changes.
///
/// Gains and losses are each summed and divided by `period` (simple
/// averages, no Wilder smoothing). A window with no losses scores 100.
pub fn rsi(closes: &[Decimal], period: usize) -> FinCalcResult<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return Err(FinCalcError::InsufficientData(format!(
            "RSI({period}) needs at least {} prices, got {}",
            period + 1,
            closes.len()
        )));
    }

    let window = &closes[closes.len() - period - 1..];
    let (mut gains, mut losses) = (Decimal::ZERO, Decimal::ZERO);
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > Decimal::ZERO {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let periods = Decimal::from(period);
    let avg_gain = gains / periods;
    let avg_loss = losses / periods;
    if avg_loss.is_zero() {
        return Ok(dec!(100));
    }
    let rs = avg_gain / avg_loss;
    Ok(dec!(100) - dec!(100) / (Decimal::ONE + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Decimal> {
        // +2, -1 alternating from 100
        let mut closes = vec![dec!(100)];
        for i in 0..14 {
            let last = closes[closes.len() - 1];
            closes.push(if i % 2 == 0 { last + dec!(2) } else { last - dec!(1) });
        }
        closes
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[dec!(1), dec!(2), dec!(6)]), Some(dec!(3)));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_period_returns() {
        let r = period_returns(&[dec!(100), dec!(110), dec!(99)]).unwrap();
        assert_eq!(r, vec![dec!(0.1), dec!(-0.1)]);
    }

    #[test]
    fn test_sample_covariance_uses_n_minus_one() {
        let a = vec![dec!(1), dec!(2), dec!(3)];
        let b = vec![dec!(2), dec!(4), dec!(6)];
        let m = sample_covariance(&[a, b]).unwrap();
        assert_eq!(m[0][0], dec!(1));
        assert_eq!(m[0][1], dec!(2));
        assert_eq!(m[1][0], m[0][1]);
        assert_eq!(m[1][1], dec!(4));
    }

    #[test]
    fn test_sample_covariance_rejects_ragged_series() {
        let err = sample_covariance(&[vec![dec!(1), dec!(2)], vec![dec!(1)]]).unwrap_err();
        assert!(matches!(err, FinCalcError::InsufficientData(_)));
    }

    #[test]
    fn test_rsi_zigzag() {
        // avg gain 1.0, avg loss 0.5 -> RS 2 -> RSI 66.67
        let value = rsi(&zigzag(), 14).unwrap();
        assert!((value - dec!(66.6667)).abs() < dec!(0.001), "got {value}");
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        let closes: Vec<Decimal> = (0..15).map(Decimal::from).collect();
        assert_eq!(rsi(&closes, 14).unwrap(), dec!(100));
    }

    #[test]
    fn test_rsi_uses_only_trailing_window() {
        let mut closes = vec![dec!(500), dec!(1)];
        closes.extend((0..15).map(|i| Decimal::from(10 + i)));
        assert_eq!(rsi(&closes, 14).unwrap(), dec!(100));
    }

    #[test]
    fn test_rsi_needs_period_plus_one_prices() {
        let closes = &zigzag()[..14];
        assert!(matches!(
            rsi(closes, 14).unwrap_err(),
            FinCalcError::InsufficientData(_)
        ));
    }
}
