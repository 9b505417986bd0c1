use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    format_money, rate_to_pct, round_money, round_ratio, with_metadata, ComputationOutput, Money,
    Percent,
};
use crate::validation;
use crate::FinCalcResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    pub cash: Money,
    pub investments: Money,
    pub real_estate: Money,
    pub vehicles: Money,
    pub retirement_accounts: Money,
    pub other: Money,
}

impl Assets {
    fn items(&self) -> [(&'static str, Money); 6] {
        [
            ("cash", self.cash),
            ("investments", self.investments),
            ("real_estate", self.real_estate),
            ("vehicles", self.vehicles),
            ("retirement_accounts", self.retirement_accounts),
            ("other", self.other),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Liabilities {
    pub mortgage: Money,
    pub auto_loans: Money,
    pub student_loans: Money,
    pub credit_cards: Money,
    pub other: Money,
}

impl Liabilities {
    fn items(&self) -> [(&'static str, Money); 5] {
        [
            ("mortgage", self.mortgage),
            ("auto_loans", self.auto_loans),
            ("student_loans", self.student_loans),
            ("credit_cards", self.credit_cards),
            ("other", self.other),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthInput {
    #[serde(default)]
    pub assets: Assets,
    #[serde(default)]
    pub liabilities: Liabilities,
}

/// One balance-sheet line and its share of its side's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub category: String,
    pub amount: Money,
    pub share_of_total: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthBreakdown {
    pub assets: Vec<LineItem>,
    pub liabilities: Vec<LineItem>,
    /// Cash + investments
    pub liquid_assets: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthOutput {
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub net_worth: Money,
    /// Liabilities / assets as a percentage; absent when there are no assets
    pub debt_to_asset_ratio: Option<Percent>,
    pub breakdown: NetWorthBreakdown,
}

pub fn calculate_net_worth(
    input: &NetWorthInput,
) -> FinCalcResult<ComputationOutput<NetWorthOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let asset_items = input.assets.items();
    let liability_items = input.liabilities.items();
    for (name, amount) in asset_items.iter().chain(liability_items.iter()) {
        validation::non_negative(name, *amount)?;
    }

    let total_assets: Money = asset_items.iter().map(|(_, v)| *v).sum();
    let total_liabilities: Money = liability_items.iter().map(|(_, v)| *v).sum();
    let net_worth = total_assets - total_liabilities;

    let debt_to_asset = if total_assets.is_zero() {
        None
    } else {
        Some(round_ratio(rate_to_pct(total_liabilities / total_assets)))
    };

    if net_worth < Decimal::ZERO {
        warnings.push("Liabilities exceed assets".into());
    }

    let output = NetWorthOutput {
        total_assets: round_money(total_assets),
        total_liabilities: round_money(total_liabilities),
        net_worth: round_money(net_worth),
        debt_to_asset_ratio: debt_to_asset,
        breakdown: NetWorthBreakdown {
            assets: line_items(&asset_items, total_assets),
            liabilities: line_items(&liability_items, total_liabilities),
            liquid_assets: round_money(input.assets.cash + input.assets.investments),
        },
    };

    let message = format!(
        "Your net worth is {} ({} in assets, {} in liabilities).",
        format_money(net_worth),
        format_money(total_assets),
        format_money(total_liabilities),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net Worth (total assets - total liabilities)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

fn line_items(items: &[(&'static str, Money)], total: Money) -> Vec<LineItem> {
    items
        .iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(name, amount)| LineItem {
            category: (*name).to_string(),
            amount: round_money(*amount),
            share_of_total: if total.is_zero() {
                Decimal::ZERO
            } else {
                round_ratio(rate_to_pct(*amount / total))
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinCalcError;
    use rust_decimal_macros::dec;

    fn household() -> NetWorthInput {
        NetWorthInput {
            assets: Assets {
                cash: dec!(15000),
                investments: dec!(60000),
                real_estate: dec!(400000),
                vehicles: dec!(25000),
                ..Assets::default()
            },
            liabilities: Liabilities {
                mortgage: dec!(280000),
                auto_loans: dec!(12000),
                credit_cards: dec!(8000),
                ..Liabilities::default()
            },
        }
    }

    #[test]
    fn test_net_worth() {
        let out = calculate_net_worth(&household()).unwrap().result;
        assert_eq!(out.total_assets, dec!(500000.00));
        assert_eq!(out.total_liabilities, dec!(300000.00));
        assert_eq!(out.net_worth, dec!(200000.00));
        assert_eq!(out.debt_to_asset_ratio, Some(dec!(60)));
        assert_eq!(out.breakdown.liquid_assets, dec!(75000.00));
    }

    #[test]
    fn test_zero_lines_omitted_from_breakdown() {
        let out = calculate_net_worth(&household()).unwrap().result;
        assert_eq!(out.breakdown.assets.len(), 4);
        assert_eq!(out.breakdown.liabilities.len(), 3);
        assert_eq!(out.breakdown.assets[2].category, "real_estate");
        assert_eq!(out.breakdown.assets[2].share_of_total, dec!(80));
    }

    #[test]
    fn test_negative_net_worth_warns() {
        let input = NetWorthInput {
            assets: Assets {
                cash: dec!(2000),
                ..Assets::default()
            },
            liabilities: Liabilities {
                student_loans: dec!(30000),
                ..Liabilities::default()
            },
        };
        let result = calculate_net_worth(&input).unwrap();
        assert_eq!(result.result.net_worth, dec!(-28000.00));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_empty_balance_sheet() {
        let input: NetWorthInput = serde_json::from_str("{}").unwrap();
        let out = calculate_net_worth(&input).unwrap().result;
        assert_eq!(out.net_worth, Decimal::ZERO);
        assert_eq!(out.debt_to_asset_ratio, None);
    }

    #[test]
    fn test_negative_line_rejected() {
        let mut input = household();
        input.assets.vehicles = dec!(-1);
        match calculate_net_worth(&input).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "vehicles"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
