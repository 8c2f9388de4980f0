//! Scenario runner for repeated projections of one base scenario
//!
//! Validates the base inputs once, then runs variations of it: single runs,
//! batches, Monte Carlo and the LTV / holding-period grid search.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::inputs::{ScenarioInputs, ScenarioStore};
use crate::monte_carlo::{run_monte_carlo, MonteCarloConfig};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// Grid for [`ScenarioRunner::optimize_strategy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub min_ltv: f64,
    pub max_ltv: f64,
    pub ltv_step: f64,
    pub max_holding_years: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_ltv: 20.0,
            max_ltv: 90.0,
            ltv_step: 5.0,
            max_holding_years: 30,
        }
    }
}

impl OptimizerConfig {
    fn ltv_grid(&self) -> ModelResult<Vec<f64>> {
        if !(self.ltv_step.is_finite() && self.ltv_step > 0.0) {
            return Err(ModelError::invalid("ltv_step", "step must be positive"));
        }
        if !(self.min_ltv.is_finite() && self.max_ltv.is_finite())
            || self.min_ltv < 0.0
            || self.max_ltv > 100.0
            || self.min_ltv > self.max_ltv
        {
            return Err(ModelError::invalid(
                "ltv_range",
                "LTV range must satisfy 0 <= min <= max <= 100",
            ));
        }
        if self.max_holding_years == 0 {
            return Err(ModelError::invalid(
                "max_holding_years",
                "must search at least 1 year",
            ));
        }
        let steps = ((self.max_ltv - self.min_ltv) / self.ltv_step + 1e-9).floor() as usize;
        Ok((0..=steps)
            .map(|i| self.min_ltv + i as f64 * self.ltv_step)
            .collect())
    }
}

/// Best grid point found by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalStrategy {
    pub loan_to_value: f64,
    pub holding_period: u32,
    /// IRR at that point (%)
    pub irr: f64,
}

/// Pre-validated runner around a base scenario
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ScenarioInputs::default())?;
/// let results = runner.run_scenarios(&[
///     runner.inputs().clone().with_loan_to_value(60.0),
///     runner.inputs().clone().with_loan_to_value(80.0),
/// ])?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(inputs: ScenarioInputs) -> ModelResult<Self> {
        Ok(Self {
            base: ProjectionEngine::new(inputs)?,
        })
    }

    /// Create runner from a named scenario in a store file
    pub fn from_store(store: &ScenarioStore, name: &str) -> ModelResult<Self> {
        Self::new(store.get(name)?)
    }

    /// Project the base scenario
    pub fn run(&self) -> ProjectionResult {
        self.base.project()
    }

    /// Project a variation of the base scenario
    pub fn run_with<F>(&self, modify: F) -> ModelResult<ProjectionResult>
    where
        F: FnOnce(ScenarioInputs) -> ScenarioInputs,
    {
        let inputs = modify(self.inputs().clone());
        Ok(ProjectionEngine::new(inputs)?.project())
    }

    /// Project several independent scenarios in parallel, results in input order
    pub fn run_scenarios(
        &self,
        scenarios: &[ScenarioInputs],
    ) -> ModelResult<Vec<ProjectionResult>> {
        scenarios
            .par_iter()
            .map(|inputs| -> ModelResult<ProjectionResult> {
                Ok(ProjectionEngine::new(inputs.clone())?.project())
            })
            .collect()
    }

    pub fn run_monte_carlo(&self, config: &MonteCarloConfig) -> ModelResult<Vec<ProjectionResult>> {
        run_monte_carlo(self.inputs(), config)
    }

    /// Grid-search LTV and holding period for the highest property IRR.
    ///
    /// The benchmark is switched off for every candidate. Ties keep the first
    /// candidate in (LTV ascending, years ascending) order.
    pub fn optimize_strategy(&self, config: &OptimizerConfig) -> ModelResult<OptimalStrategy> {
        let candidates: Vec<(f64, u32)> = config
            .ltv_grid()?
            .into_iter()
            .flat_map(|ltv| (1..=config.max_holding_years).map(move |years| (ltv, years)))
            .collect();

        let evaluated = candidates
            .par_iter()
            .map(|&(ltv, years)| -> ModelResult<OptimalStrategy> {
                let inputs = ScenarioInputs {
                    benchmark_enabled: false,
                    ..self.inputs().clone()
                }
                .with_loan_to_value(ltv)
                .with_holding_period(years);
                let result = ProjectionEngine::new(inputs)?.project();
                Ok(OptimalStrategy {
                    loan_to_value: ltv,
                    holding_period: years,
                    irr: result.irr,
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let best = evaluated
            .into_iter()
            .reduce(|best, candidate| if candidate.irr > best.irr { candidate } else { best })
            .ok_or_else(|| ModelError::invalid("optimizer", "empty search grid"))?;

        log::info!(
            "optimal strategy: LTV {:.0}% held {} years, IRR {:.2}%",
            best.loan_to_value,
            best.holding_period,
            best.irr
        );
        Ok(best)
    }

    pub fn inputs(&self) -> &ScenarioInputs {
        self.base.inputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::RateInput;
    use crate::monte_carlo::RateTriple;

    #[test]
    fn test_scenario_runner_batch() {
        let runner = ScenarioRunner::new(ScenarioInputs::default()).unwrap();

        let scenarios: Vec<_> = [2.0, 3.0, 4.0]
            .iter()
            .map(|&rate| ScenarioInputs {
                appreciation_rate: RateInput::Constant(rate),
                ..runner.inputs().clone()
            })
            .collect();

        let results = runner.run_scenarios(&scenarios).unwrap();
        assert_eq!(results.len(), 3);

        // Faster appreciation means a higher sale price and IRR
        assert!(results[2].irr > results[0].irr);
        assert!(results[2].sale.sale_price > results[1].sale.sale_price);
    }

    #[test]
    fn test_run_matches_engine() {
        let runner = ScenarioRunner::new(ScenarioInputs::default()).unwrap();
        let direct = ProjectionEngine::new(ScenarioInputs::default()).unwrap().project();
        assert_eq!(runner.run(), direct);
    }

    #[test]
    fn test_run_with_revalidates() {
        let runner = ScenarioRunner::new(ScenarioInputs::default()).unwrap();
        assert!(runner.run_with(|inputs| inputs.with_holding_period(0)).is_err());
        let short = runner.run_with(|inputs| inputs.with_holding_period(3)).unwrap();
        assert_eq!(short.years.len(), 3);
    }

    #[test]
    fn test_runner_monte_carlo() {
        let runner = ScenarioRunner::new(ScenarioInputs::default()).unwrap();
        let config = MonteCarloConfig::around(
            runner.inputs(),
            5,
            3,
            RateTriple {
                appreciation: 1.0,
                rent_growth: 1.0,
                benchmark_return: 1.0,
            },
        );
        assert_eq!(runner.run_monte_carlo(&config).unwrap().len(), 5);
    }

    #[test]
    fn test_optimizer_matches_brute_force() {
        let runner = ScenarioRunner::new(ScenarioInputs::default()).unwrap();
        let config = OptimizerConfig {
            min_ltv: 40.0,
            max_ltv: 80.0,
            ltv_step: 20.0,
            max_holding_years: 6,
        };
        let best = runner.optimize_strategy(&config).unwrap();

        let mut expected: Option<OptimalStrategy> = None;
        for ltv in [40.0, 60.0, 80.0] {
            for years in 1..=6 {
                let irr = runner
                    .run_with(|inputs| {
                        ScenarioInputs {
                            benchmark_enabled: false,
                            ..inputs
                        }
                        .with_loan_to_value(ltv)
                        .with_holding_period(years)
                    })
                    .unwrap()
                    .irr;
                if expected.as_ref().map_or(true, |e| irr > e.irr) {
                    expected = Some(OptimalStrategy {
                        loan_to_value: ltv,
                        holding_period: years,
                        irr,
                    });
                }
            }
        }
        assert_eq!(Some(best), expected);
    }

    #[test]
    fn test_ltv_grid() {
        let grid = OptimizerConfig::default().ltv_grid().unwrap();
        assert_eq!(grid.len(), 15);
        assert_eq!(grid[0], 20.0);
        assert_eq!(grid[14], 90.0);

        let bad = OptimizerConfig {
            ltv_step: 0.0,
            ..Default::default()
        };
        assert!(bad.ltv_grid().is_err());
    }
}
