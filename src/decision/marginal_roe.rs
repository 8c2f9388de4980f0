//! Year-over-year return on the equity locked in the property

use serde::{Deserialize, Serialize};

use super::DecisionPolicy;
use crate::projection::{liquidate, ProjectionResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalRoeRow {
    pub year: u32,
    pub property_value: f64,
    pub loan_balance: f64,
    /// Cash released by selling at the end of this year
    pub net_equity: f64,
    /// Return on `net_equity` from holding one more year (%)
    pub marginal_roe: f64,
    pub benchmark_rate: f64,
    /// `marginal_roe - benchmark_rate`
    pub gap: f64,
}

/// Marginal ROE table for every projected year.
///
/// The final year has no successor and reports 0, as does any year whose net
/// equity is not positive.
pub fn marginal_roe(result: &ProjectionResult, policy: &DecisionPolicy) -> Vec<MarginalRoeRow> {
    let net_equity: Vec<f64> = result
        .years
        .iter()
        .map(|y| liquidate(&policy.sale, y.property_value, y.loan_balance, y.year).net_proceeds)
        .collect();

    result
        .years
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let equity = net_equity[i];
            let marginal = match (result.years.get(i + 1), net_equity.get(i + 1)) {
                (Some(next), Some(next_equity)) if equity > 0.0 => {
                    (next_equity - equity + next.operating_cashflow) / equity * 100.0
                }
                _ => 0.0,
            };

            MarginalRoeRow {
                year: record.year,
                property_value: record.property_value,
                loan_balance: record.loan_balance,
                net_equity: equity,
                marginal_roe: marginal,
                benchmark_rate: policy.benchmark_rate,
                gap: marginal - policy.benchmark_rate,
            }
        })
        .collect()
}

/// First year in which holding returns less than the benchmark.
///
/// The terminal row is not measured and never counts.
pub fn break_even_year(rows: &[MarginalRoeRow]) -> Option<u32> {
    let measured = rows.len().saturating_sub(1);
    rows[..measured]
        .iter()
        .find(|row| row.marginal_roe < row.benchmark_rate)
        .map(|row| row.year)
}
