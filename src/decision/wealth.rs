//! Forward net-worth paths for "keep holding" versus "sell and invest"

use serde::{Deserialize, Serialize};

use crate::projection::remaining_balance;

/// State of the investment at the decision point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthSnapshot {
    pub property_value: f64,
    pub debt: f64,
    /// Net cash if sold today, the starting stake of the sell path
    pub liquidation_cash: f64,
    pub monthly_payment: f64,
    /// Loan rate (% p.a.)
    pub loan_rate: f64,
    pub appreciation_rate: f64,
    pub benchmark_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthRow {
    /// Years after the decision point
    pub year: u32,
    pub net_worth_if_held: f64,
    pub net_worth_if_sold: f64,
}

/// Asset-value comparison only; rental cashflow is not accumulated on either path
pub fn project_wealth(snapshot: &WealthSnapshot, years: u32) -> Vec<WealthRow> {
    let monthly_rate = snapshot.loan_rate / 100.0 / 12.0;
    let mut value = snapshot.property_value;
    let mut debt = snapshot.debt.max(0.0);
    let mut invested = snapshot.liquidation_cash;

    (1..=years)
        .map(|year| {
            value *= 1.0 + snapshot.appreciation_rate / 100.0;
            if debt > 0.0 {
                debt = remaining_balance(debt, monthly_rate, snapshot.monthly_payment, 12);
            }
            invested *= 1.0 + snapshot.benchmark_rate / 100.0;

            WealthRow {
                year,
                net_worth_if_held: value - debt,
                net_worth_if_sold: invested,
            }
        })
        .collect()
}
