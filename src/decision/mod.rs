//! Hold / sell / refinance analytics built on a projection run

mod liquidation;
mod marginal_roe;
mod wealth;

pub use liquidation::{liquidation_metrics, LiquidationMetrics};
pub use marginal_roe::{break_even_year, marginal_roe, MarginalRoeRow};
pub use wealth::{project_wealth, WealthRow, WealthSnapshot};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::inputs::ScenarioInputs;
use crate::projection::{LoanState, ProjectionEngine, ProjectionResult, SaleTerms};

/// Horizon used when looking for the best moment to exit
pub const STRATEGY_HORIZON_YEARS: u32 = 30;

/// Return assumed for the alternative when the benchmark is switched off (%)
pub const DEFAULT_BENCHMARK_RATE: f64 = 8.0;

pub const DEFAULT_REFINANCE_LTV: f64 = 70.0;

/// Parameters for the decision layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub sale: SaleTerms,
    /// Return the equity could earn elsewhere (%)
    pub benchmark_rate: f64,
    /// Rate on the existing loan (%)
    pub current_rate: f64,
    pub current_monthly_payment: f64,
    /// Rate a new loan would carry today (%)
    pub market_refinance_rate: f64,
    pub target_refinance_ltv: f64,
    pub refinance_term_years: u32,
}

impl DecisionPolicy {
    /// Defaults taken from the scenario: benchmark mean return, refinance at today's rate
    pub fn from_inputs(inputs: &ScenarioInputs) -> Self {
        let loan = LoanState::new(
            inputs.loan_amount(),
            inputs.interest_rate,
            inputs.loan_term_years,
        );
        let benchmark_rate = if inputs.benchmark_enabled {
            inputs.benchmark_return.mean()
        } else {
            DEFAULT_BENCHMARK_RATE
        };
        Self {
            sale: SaleTerms::from_inputs(inputs),
            benchmark_rate,
            current_rate: inputs.interest_rate,
            current_monthly_payment: loan.monthly_payment,
            market_refinance_rate: inputs.interest_rate,
            target_refinance_ltv: DEFAULT_REFINANCE_LTV,
            refinance_term_years: 30,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.refinance_term_years == 0 {
            return Err(ModelError::invalid(
                "refinance_term_years",
                "refinance term must be at least 1 year",
            ));
        }
        for (field, value) in [
            ("benchmark_rate", self.benchmark_rate),
            ("market_refinance_rate", self.market_refinance_rate),
            ("target_refinance_ltv", self.target_refinance_ltv),
        ] {
            if !value.is_finite() {
                return Err(ModelError::invalid(field, "must be a finite number"));
            }
        }
        Ok(())
    }
}

/// Re-run the scenario over a fixed horizon instead of its own holding period
pub fn strategy_projection(
    inputs: &ScenarioInputs,
    horizon_years: u32,
) -> ModelResult<ProjectionResult> {
    let engine = ProjectionEngine::new(inputs.clone().with_holding_period(horizon_years))?;
    Ok(engine.project())
}

/// Everything the strategy view shows for one decision year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub year: u32,
    /// Price the projection expects at year end
    pub model_price: f64,
    /// Price actually used, possibly overridden by the caller
    pub price: f64,
    pub loan_balance: f64,
    pub liquidation: LiquidationMetrics,
    pub wealth: Vec<WealthRow>,
}

/// Evaluate selling or refinancing at the end of `year`.
///
/// `price_override` replaces the projected market value; the wealth paths run
/// `wealth_years` forward from that point.
pub fn evaluate_decision_year(
    inputs: &ScenarioInputs,
    result: &ProjectionResult,
    policy: &DecisionPolicy,
    year: u32,
    price_override: Option<f64>,
    wealth_years: u32,
) -> ModelResult<DecisionPoint> {
    policy.validate()?;
    let record = year
        .checked_sub(1)
        .and_then(|idx| result.years.get(idx as usize))
        .ok_or_else(|| {
            ModelError::invalid(
                "decision_year",
                format!("year must be between 1 and {}", result.years.len()),
            )
        })?;

    // Past the loan term there is no payment left to compare against
    let paid_off = record.loan_balance == 0.0;
    let policy = &DecisionPolicy {
        current_monthly_payment: if paid_off {
            0.0
        } else {
            policy.current_monthly_payment
        },
        ..policy.clone()
    };

    let price = price_override.unwrap_or(record.property_value);
    let liquidation = liquidation_metrics(price, record.loan_balance, year, policy);

    let appreciation = inputs.appreciation_rate.mean();
    let wealth = project_wealth(
        &WealthSnapshot {
            property_value: price,
            debt: record.loan_balance,
            liquidation_cash: liquidation.net_liquidation_value,
            monthly_payment: policy.current_monthly_payment,
            loan_rate: policy.current_rate,
            appreciation_rate: appreciation,
            benchmark_rate: policy.benchmark_rate,
        },
        wealth_years,
    );

    Ok(DecisionPoint {
        year,
        model_price: record.property_value,
        price,
        loan_balance: record.loan_balance,
        liquidation,
        wealth,
    })
}
