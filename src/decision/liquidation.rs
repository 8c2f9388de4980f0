//! Point-in-time sell and cash-out refinance figures

use serde::{Deserialize, Serialize};

use super::DecisionPolicy;
use crate::projection::{compute_payment, liquidate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationMetrics {
    /// Cash left after selling at the given price
    pub net_liquidation_value: f64,
    pub sale_costs: f64,
    pub capital_gains_tax: f64,

    /// Loan sized at the target LTV of the given price
    pub new_loan_amount: f64,
    /// Equity pulled out by refinancing, never negative
    pub refinance_cash_out: f64,
    /// Benchmark return on the cash-out less the extra interest cost, per year
    pub refinance_arbitrage_per_year: f64,
    pub refinanced_monthly_payment: f64,
    pub payment_change: f64,
}

/// Sell / refinance figures at a caller-chosen `price`
pub fn liquidation_metrics(
    price: f64,
    loan_balance: f64,
    years_held: u32,
    policy: &DecisionPolicy,
) -> LiquidationMetrics {
    let sale = liquidate(&policy.sale, price, loan_balance, years_held);

    let new_loan_amount = price * policy.target_refinance_ltv / 100.0;
    let refinance_cash_out = (new_loan_amount - loan_balance).max(0.0);

    let (refinance_arbitrage_per_year, refinanced_monthly_payment) = if refinance_cash_out > 0.0 {
        let invested = refinance_cash_out * policy.benchmark_rate / 100.0;
        let extra_interest = new_loan_amount * policy.market_refinance_rate / 100.0
            - loan_balance * policy.current_rate / 100.0;
        let (payment, _) = compute_payment(
            new_loan_amount,
            policy.market_refinance_rate,
            policy.refinance_term_years,
        );
        (invested - extra_interest, payment)
    } else {
        // No refinance: the existing loan stays
        (0.0, policy.current_monthly_payment)
    };

    LiquidationMetrics {
        net_liquidation_value: sale.net_proceeds,
        sale_costs: sale.sale_costs,
        capital_gains_tax: sale.capital_gains_tax,
        new_loan_amount,
        refinance_cash_out,
        refinance_arbitrage_per_year,
        refinanced_monthly_payment,
        payment_change: refinanced_monthly_payment - policy.current_monthly_payment,
    }
}
