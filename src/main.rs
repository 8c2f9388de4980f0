//! Property Investment CLI
//!
//! Projects one scenario and prints the yearly table and headline metrics

use anyhow::{Context, Result};
use clap::Parser;
use property_investment::export::{write_year_table, year_rows};
use property_investment::{ProjectionEngine, ScenarioInputs, ScenarioStore};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "property-model",
    about = "Project a leveraged rental property against an index-fund benchmark"
)]
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

    /// Save the scenario under this name in the store before running
    #[arg(long)]
    save: Option<String>,

    /// Write the yearly table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Report values in today's money
    #[arg(long, default_value_t = false)]
    real: bool,

    /// Print the full result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn load_inputs(cli: &Cli, store: &ScenarioStore) -> Result<ScenarioInputs> {
    if let Some(path) = &cli.scenario {
        return ScenarioInputs::from_file(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()));
    }
    if let Some(name) = &cli.name {
        return store
            .get(name)
            .with_context(|| {
                format!(
                    "Failed to load scenario '{}' from {}",
                    name,
                    store.path().display()
                )
            });
    }
    Ok(ScenarioInputs::default())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = ScenarioStore::new(&cli.store);
    let inputs = load_inputs(&cli, &store)?;
    if let Some(name) = &cli.save {
        store
            .save(name, &inputs)
            .with_context(|| format!("Failed to save scenario '{}'", name))?;
    }

    let engine = ProjectionEngine::new(inputs)?;
    let result = engine.project();

    if let Some(path) = &cli.csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_year_table(file, &result, cli.real)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let summary = result.summary();
    println!("Property Investment Model");
    println!("=========================\n");
    println!("  Purchase price:      {:>14.0}", engine.inputs().purchase_price);
    println!(
        "  Loan:                {:>14.0} (LTV {:.1}%)",
        summary.loan_amount, summary.loan_to_value
    );
    println!("  Monthly payment:     {:>14.0}", summary.monthly_payment);
    println!("  Initial investment:  {:>14.0}", result.initial_investment);
    println!();

    let label = if cli.real { "real" } else { "nominal" };
    println!("Yearly projection ({}):", label);
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>12} {:>14}",
        "Year", "Value", "Loan", "Equity", "Cashflow", "Benchmark"
    );
    println!("{}", "-".repeat(78));
    for row in year_rows(&result, cli.real) {
        println!(
            "{:>4} {:>14.0} {:>14.0} {:>14.0} {:>12.0} {:>14}",
            row.year,
            row.property_value,
            row.loan_balance,
            row.equity,
            row.operating_cashflow,
            row.benchmark_value
                .map(|v| format!("{:.0}", v))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    println!("\nSummary:");
    println!("  IRR:                      {:>10.2}%", result.irr);
    println!("  Total profit:             {:>14.0}", result.total_profit);
    println!("  ROI:                      {:>10.2}%", summary.roi);
    println!("  Year-1 monthly cashflow:  {:>14.0}", result.year1_monthly_cashflow);
    println!("  Year-1 tax paid:          {:>14.0}", result.year1_tax_paid);
    println!("  Cash-on-cash (year 1):    {:>10.2}%", summary.cash_on_cash);
    println!("  Sale price:               {:>14.0}", summary.sale_price);
    println!("  Sale costs:               {:>14.0}", summary.sale_costs);
    println!("  Capital gains tax:        {:>14.0}", result.capital_gains_tax);
    println!("  Net sale proceeds:        {:>14.0}", summary.net_sale_proceeds);

    if result.benchmark_enabled {
        println!("\nBenchmark:");
        println!("  IRR:                      {:>10.2}%", result.benchmark_irr);
        println!("  Final value:              {:>14.0}", summary.benchmark_final_value);
        println!("  Total invested:           {:>14.0}", summary.benchmark_total_invested);
        println!("  Profit:                   {:>14.0}", summary.benchmark_profit);
        println!("  IRR spread:               {:>+10.2} pp", summary.irr_spread);
    }

    if let Some(path) = &cli.csv {
        println!("\nYearly table written to: {}", path.display());
    }

    Ok(())
}
