//! Property Investment - year-by-year projection engine for a leveraged rental
//! property against an index-fund benchmark
//!
//! This library provides:
//! - Fixed-rate amortization and a yearly projection with income and capital gains tax
//! - A currency-translated benchmark topped up with the property's shortfalls
//! - IRR reduction of cashflow vectors
//! - Monte Carlo over appreciation, rent growth and benchmark return
//! - Hold / sell / refinance analytics and forward wealth paths
//! - JSON scenario files and CSV export of the yearly table

pub mod decision;
pub mod error;
pub mod export;
pub mod inputs;
pub mod monte_carlo;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ModelError, ModelResult};
pub use inputs::{CapitalGainsPolicy, RateInput, ScenarioInputs, ScenarioStore};
pub use monte_carlo::{run_monte_carlo, MonteCarloConfig, MonteCarloSummary, RateTriple};
pub use projection::{ProjectionEngine, ProjectionResult, ProjectionSummary, YearRecord};
pub use scenario::{OptimalStrategy, OptimizerConfig, ScenarioRunner};
