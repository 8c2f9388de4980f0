//! Net proceeds of selling the property
//!
//! The projection, the marginal ROE table and the liquidation calculator all
//! price a sale through [`liquidate`].

use serde::{Deserialize, Serialize};

use crate::inputs::{CapitalGainsPolicy, ScenarioInputs};

/// Scenario-level terms that apply to any sale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleTerms {
    /// Purchase price plus one-off acquisition costs
    pub acquisition_cost: f64,
    pub sale_fee_percent: f64,
    pub tax_rate: f64,
    pub policy: CapitalGainsPolicy,
}

impl SaleTerms {
    pub fn from_inputs(inputs: &ScenarioInputs) -> Self {
        Self {
            acquisition_cost: inputs.acquisition_cost(),
            sale_fee_percent: inputs.sale_fee_percent,
            tax_rate: inputs.tax_rate,
            policy: inputs.capital_gains,
        }
    }
}

/// Breakdown of a sale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub sale_price: f64,
    pub sale_costs: f64,
    pub taxable_gain: f64,
    pub capital_gains_tax: f64,
    /// Cash left after repaying debt, costs and tax
    pub net_proceeds: f64,
}

/// Sell at `price` with `debt` outstanding after holding for `years_held` years
pub fn liquidate(terms: &SaleTerms, price: f64, debt: f64, years_held: u32) -> SaleOutcome {
    let sale_costs = price * terms.sale_fee_percent / 100.0;
    let taxable_gain = price - sale_costs - terms.acquisition_cost;

    let capital_gains_tax = if taxable_gain > 0.0 && terms.policy.is_taxable(years_held) {
        taxable_gain * terms.tax_rate / 100.0
    } else {
        0.0
    };

    SaleOutcome {
        sale_price: price,
        sale_costs,
        taxable_gain,
        capital_gains_tax,
        net_proceeds: price - debt - sale_costs - capital_gains_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn terms(policy: CapitalGainsPolicy) -> SaleTerms {
        SaleTerms {
            acquisition_cost: 5_150_000.0,
            sale_fee_percent: 3.0,
            tax_rate: 15.0,
            policy,
        }
    }

    #[test]
    fn test_gain_taxed_inside_time_test() {
        let outcome = liquidate(
            &terms(CapitalGainsPolicy::TimeTest { exempt_after_years: 10 }),
            7_000_000.0,
            3_000_000.0,
            5,
        );
        assert_abs_diff_eq!(outcome.sale_costs, 210_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(outcome.taxable_gain, 1_640_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(outcome.capital_gains_tax, 246_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(outcome.net_proceeds, 3_544_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gain_exempt_at_threshold() {
        let outcome = liquidate(
            &terms(CapitalGainsPolicy::TimeTest { exempt_after_years: 10 }),
            7_000_000.0,
            0.0,
            10,
        );
        assert_eq!(outcome.capital_gains_tax, 0.0);
    }

    #[test]
    fn test_loss_is_never_taxed() {
        let outcome = liquidate(&terms(CapitalGainsPolicy::AlwaysTax), 5_000_000.0, 0.0, 3);
        assert!(outcome.taxable_gain < 0.0);
        assert_eq!(outcome.capital_gains_tax, 0.0);
    }

    #[test]
    fn test_never_tax_mode() {
        let outcome = liquidate(&terms(CapitalGainsPolicy::NeverTax), 9_000_000.0, 0.0, 1);
        assert_eq!(outcome.capital_gains_tax, 0.0);
        assert_abs_diff_eq!(outcome.net_proceeds, 8_730_000.0, epsilon = 1e-6);
    }
}
