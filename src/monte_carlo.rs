//! Monte Carlo over appreciation, rent growth and benchmark return paths
//!
//! Each simulation draws an independent normal value per projection year for
//! each of the three rates and re-runs the projection with those per-year
//! sequences. The three series are uncorrelated.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::{ModelError, ModelResult};
use crate::inputs::{RateInput, ScenarioInputs};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// One value for each stochastic rate (percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTriple {
    pub appreciation: f64,
    pub rent_growth: f64,
    pub benchmark_return: f64,
}

impl RateTriple {
    /// Mean of each rate input in `inputs`
    pub fn means_of(inputs: &ScenarioInputs) -> Self {
        Self {
            appreciation: inputs.appreciation_rate.mean(),
            rent_growth: inputs.rent_growth_rate.mean(),
            benchmark_return: inputs.benchmark_return.mean(),
        }
    }

    fn fields(&self) -> [(&'static str, f64); 3] {
        [
            ("appreciation", self.appreciation),
            ("rent_growth", self.rent_growth),
            ("benchmark_return", self.benchmark_return),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub simulations: u32,
    pub seed: u64,
    pub mean: RateTriple,
    pub std_dev: RateTriple,
}

impl MonteCarloConfig {
    /// Centre the draws on the scenario's own rates
    pub fn around(
        inputs: &ScenarioInputs,
        simulations: u32,
        seed: u64,
        std_dev: RateTriple,
    ) -> Self {
        Self {
            simulations,
            seed,
            mean: RateTriple::means_of(inputs),
            std_dev,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        for (field, value) in self.mean.fields() {
            if !value.is_finite() {
                return Err(ModelError::invalid(field, "mean rate must be finite"));
            }
        }
        for (field, value) in self.std_dev.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::invalid(
                    field,
                    "standard deviation must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Normal sampler that degenerates to its mean when sigma is 0
#[derive(Debug, Clone)]
struct RateSampler {
    mean: f64,
    normal: Option<Normal>,
}

impl RateSampler {
    fn new(field: &str, mean: f64, std_dev: f64) -> ModelResult<Self> {
        let normal = if std_dev > 0.0 {
            Some(Normal::new(mean, std_dev).map_err(|e| {
                ModelError::invalid(field, format!("invalid normal parameters: {e}"))
            })?)
        } else {
            None
        };
        Ok(Self { mean, normal })
    }

    fn path(&self, rng: &mut StdRng, years: u32) -> Vec<f64> {
        (0..years)
            .map(|_| match &self.normal {
                Some(normal) => rng.sample(normal),
                None => self.mean,
            })
            .collect()
    }
}

/// Run `config.simulations` projections of `base` with sampled rate paths.
///
/// Simulation `i` seeds its own generator with `seed + i`, so the output is
/// identical however rayon schedules the work. Results are in simulation order.
pub fn run_monte_carlo(
    base: &ScenarioInputs,
    config: &MonteCarloConfig,
) -> ModelResult<Vec<ProjectionResult>> {
    base.validate()?;
    config.validate()?;

    let appreciation = RateSampler::new(
        "appreciation",
        config.mean.appreciation,
        config.std_dev.appreciation,
    )?;
    let rent_growth = RateSampler::new(
        "rent_growth",
        config.mean.rent_growth,
        config.std_dev.rent_growth,
    )?;
    let benchmark = RateSampler::new(
        "benchmark_return",
        config.mean.benchmark_return,
        config.std_dev.benchmark_return,
    )?;

    log::info!(
        "running {} simulations over {} years (seed {})",
        config.simulations,
        base.holding_period,
        config.seed
    );

    let years = base.holding_period;
    let results = (0..config.simulations as u64)
        .into_par_iter()
        .map(|i| -> ModelResult<ProjectionResult> {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i));
            let inputs = ScenarioInputs {
                appreciation_rate: RateInput::PerYear(appreciation.path(&mut rng, years)),
                rent_growth_rate: RateInput::PerYear(rent_growth.path(&mut rng, years)),
                benchmark_return: RateInput::PerYear(benchmark.path(&mut rng, years)),
                ..base.clone()
            };
            Ok(ProjectionEngine::new(inputs)?.project())
        })
        .collect::<ModelResult<Vec<_>>>()?;

    log::info!("completed {} simulations", results.len());
    Ok(results)
}

/// Equal-width histogram bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Aggregate outcome of a Monte Carlo batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub simulations: u32,
    pub mean_irr: f64,
    pub median_irr: f64,
    /// Fraction of runs with negative total profit
    pub probability_of_loss: f64,
    pub p5_irr: f64,
    pub p10_irr: f64,
    pub p25_irr: f64,
    pub p50_irr: f64,
    pub p75_irr: f64,
    pub p90_irr: f64,
    pub p95_irr: f64,
    pub mean_benchmark_irr: f64,
    pub median_benchmark_irr: f64,
    /// Every run's IRR, ascending
    pub irr_distribution: Vec<f64>,
}

impl MonteCarloSummary {
    pub fn from_results(results: &[ProjectionResult]) -> Self {
        let mut irrs: Vec<f64> = results.iter().map(|r| r.irr).collect();
        let mut benchmark_irrs: Vec<f64> = results.iter().map(|r| r.benchmark_irr).collect();
        sort_values(&mut irrs);
        sort_values(&mut benchmark_irrs);

        let losses = results.iter().filter(|r| r.total_profit < 0.0).count();
        let probability_of_loss = if results.is_empty() {
            0.0
        } else {
            losses as f64 / results.len() as f64
        };

        Self {
            simulations: results.len() as u32,
            mean_irr: mean(&irrs),
            median_irr: percentile_sorted(&irrs, 50.0),
            probability_of_loss,
            p5_irr: percentile_sorted(&irrs, 5.0),
            p10_irr: percentile_sorted(&irrs, 10.0),
            p25_irr: percentile_sorted(&irrs, 25.0),
            p50_irr: percentile_sorted(&irrs, 50.0),
            p75_irr: percentile_sorted(&irrs, 75.0),
            p90_irr: percentile_sorted(&irrs, 90.0),
            p95_irr: percentile_sorted(&irrs, 95.0),
            mean_benchmark_irr: mean(&benchmark_irrs),
            median_benchmark_irr: percentile_sorted(&benchmark_irrs, 50.0),
            irr_distribution: irrs,
        }
    }

    /// IRR histogram with `bins` equal-width bins over the observed range
    pub fn histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let sorted = &self.irr_distribution;
        let (Some(&min_val), Some(&max_val)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };
        if bins == 0 {
            return Vec::new();
        }

        if (max_val - min_val).abs() < f64::EPSILON {
            return vec![HistogramBin {
                lower: min_val,
                upper: max_val,
                count: sorted.len() as u32,
                frequency: 1.0,
            }];
        }

        let width = (max_val - min_val) / bins as f64;
        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min_val + i as f64 * width,
                upper: if i == bins - 1 {
                    max_val
                } else {
                    min_val + (i + 1) as f64 * width
                },
                count: 0,
                frequency: 0.0,
            })
            .collect();

        for &value in sorted {
            let idx = (((value - min_val) / width).floor() as usize).min(bins - 1);
            histogram[idx].count += 1;
        }
        let n = sorted.len() as f64;
        for bin in &mut histogram {
            bin.frequency = bin.count as f64 / n;
        }
        histogram
    }
}

fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Linear-interpolated percentile of an ascending slice, 0 when empty
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = p / 100.0 * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] * (1.0 - frac) + sorted[upper] * frac
        }
    }
}
