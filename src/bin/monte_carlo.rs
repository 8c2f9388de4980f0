//! Monte Carlo batch over appreciation, rent growth and benchmark return
//!
//! Prints the IRR distribution summary, or the full summary as JSON with --json

use anyhow::{Context, Result};
use clap::Parser;
use property_investment::{
    MonteCarloConfig, MonteCarloSummary, RateTriple, ScenarioInputs, ScenarioRunner, ScenarioStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "monte-carlo", about = "Monte Carlo distribution of property IRR")]
struct Cli {
    /// Single scenario JSON file. Missing fields use the defaults.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Scenario store file holding named scenarios
    #[arg(long, default_value = "scenarios.json")]
    store: PathBuf,

    /// Name of a scenario in the store
    #[arg(long)]
    name: Option<String>,

    #[arg(long, default_value_t = 1000)]
    simulations: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Standard deviation of yearly appreciation (pp)
    #[arg(long, default_value_t = 2.0)]
    appreciation_vol: f64,

    /// Standard deviation of yearly rent growth (pp)
    #[arg(long, default_value_t = 1.0)]
    rent_growth_vol: f64,

    /// Standard deviation of yearly benchmark return (pp)
    #[arg(long, default_value_t = 15.0)]
    benchmark_vol: f64,

    /// Number of histogram bins
    #[arg(long, default_value_t = 50)]
    bins: usize,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct MonteCarloResponse {
    config: MonteCarloConfig,
    summary: MonteCarloSummary,
    histogram: Vec<property_investment::monte_carlo::HistogramBin>,
    execution_time_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let inputs = match (&cli.scenario, &cli.name) {
        (Some(path), _) => ScenarioInputs::from_file(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?,
        (None, Some(name)) => ScenarioStore::new(&cli.store)
            .get(name)
            .with_context(|| format!("Failed to load scenario '{}'", name))?,
        (None, None) => ScenarioInputs::default(),
    };

    let runner = ScenarioRunner::new(inputs)?;
    let config = MonteCarloConfig::around(
        runner.inputs(),
        cli.simulations,
        cli.seed,
        RateTriple {
            appreciation: cli.appreciation_vol,
            rent_growth: cli.rent_growth_vol,
            benchmark_return: cli.benchmark_vol,
        },
    );

    let results = runner.run_monte_carlo(&config)?;
    let summary = MonteCarloSummary::from_results(&results);
    let histogram = summary.histogram(cli.bins);
    let elapsed = start.elapsed();

    if cli.json {
        let response = MonteCarloResponse {
            config,
            summary,
            histogram,
            execution_time_ms: elapsed.as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "Monte Carlo: {} simulations (seed {}) in {:?}",
        summary.simulations, cli.seed, elapsed
    );
    println!(
        "  Mean rates: appreciation {:.2}%, rent growth {:.2}%, benchmark {:.2}%",
        config.mean.appreciation, config.mean.rent_growth, config.mean.benchmark_return
    );
    println!();
    println!("  Mean IRR:            {:>8.2}%", summary.mean_irr);
    println!("  Median IRR:          {:>8.2}%", summary.median_irr);
    println!("  Probability of loss: {:>8.2}%", summary.probability_of_loss * 100.0);
    println!("  Benchmark mean IRR:  {:>8.2}%", summary.mean_benchmark_irr);
    println!();
    println!("  Percentiles:");
    for (label, value) in [
        ("P5", summary.p5_irr),
        ("P10", summary.p10_irr),
        ("P25", summary.p25_irr),
        ("P50", summary.p50_irr),
        ("P75", summary.p75_irr),
        ("P90", summary.p90_irr),
        ("P95", summary.p95_irr),
    ] {
        println!("    {:<4} {:>8.2}%", label, value);
    }

    if !histogram.is_empty() {
        println!("\n  IRR histogram:");
        let widest = histogram.iter().map(|b| b.count).max().unwrap_or(1).max(1);
        for bin in &histogram {
            let bar = "#".repeat((bin.count as usize * 40) / widest as usize);
            println!("    {:>7.2} .. {:>7.2} {:>6} {}", bin.lower, bin.upper, bin.count, bar);
        }
    }

    Ok(())
}
