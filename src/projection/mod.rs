//! Year-by-year projection engine and its building blocks

pub mod amortization;
mod cashflows;
mod engine;
pub mod irr;
pub mod sale;

pub use amortization::{compute_payment, remaining_balance, LoanState};
pub use cashflows::{ProjectionResult, ProjectionSeries, ProjectionSummary, YearRecord};
pub use engine::{ProjectionEngine, ResolvedRates};
pub use irr::{calculate_irr, irr_percent};
pub use sale::{liquidate, SaleOutcome, SaleTerms};

use crate::error::ModelResult;
use crate::inputs::ScenarioInputs;

/// Validate `inputs` and run a single projection
pub fn project(inputs: &ScenarioInputs) -> ModelResult<ProjectionResult> {
    Ok(ProjectionEngine::new(inputs.clone())?.project())
}
