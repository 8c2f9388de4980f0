//! Hold / sell / refinance analysis over a long horizon
//!
//! Prints the marginal ROE table, the break-even year, the liquidation and
//! refinance figures at a decision year and, with --optimize, the best
//! LTV / holding period combination.

use anyhow::{Context, Result};
use clap::Parser;
use property_investment::decision::{
    break_even_year, evaluate_decision_year, marginal_roe, strategy_projection, DecisionPolicy,
    STRATEGY_HORIZON_YEARS,
};
use property_investment::{OptimizerConfig, ScenarioInputs, ScenarioRunner, ScenarioStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strategy", about = "Hold, sell or refinance a rental property")]
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

    /// Years to project for the strategy view
    #[arg(long, default_value_t = STRATEGY_HORIZON_YEARS)]
    horizon: u32,

    /// Decision year. Defaults to the scenario's holding period.
    #[arg(long)]
    year: Option<u32>,

    /// Market price at the decision year instead of the projected one
    #[arg(long)]
    price: Option<f64>,

    /// Return expected from the alternative (%). Defaults to the benchmark return.
    #[arg(long)]
    benchmark_rate: Option<f64>,

    /// Rate a new loan would carry (%). Defaults to the current loan rate.
    #[arg(long)]
    refinance_rate: Option<f64>,

    /// Target LTV of a cash-out refinance (%)
    #[arg(long, default_value_t = 70.0)]
    refinance_ltv: f64,

    /// Term of the refinanced loan in years
    #[arg(long, default_value_t = 30)]
    refinance_term: u32,

    /// Years to run the hold / sell wealth paths
    #[arg(long, default_value_t = 10)]
    wealth_years: u32,

    /// Also grid-search LTV and holding period for the best IRR
    #[arg(long, default_value_t = false)]
    optimize: bool,

    /// Print the analysis as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let inputs = match (&cli.scenario, &cli.name) {
        (Some(path), _) => ScenarioInputs::from_file(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?,
        (None, Some(name)) => ScenarioStore::new(&cli.store)
            .get(name)
            .with_context(|| format!("Failed to load scenario '{}'", name))?,
        (None, None) => ScenarioInputs::default(),
    };

    let defaults = DecisionPolicy::from_inputs(&inputs);
    let policy = DecisionPolicy {
        benchmark_rate: cli.benchmark_rate.unwrap_or(defaults.benchmark_rate),
        market_refinance_rate: cli.refinance_rate.unwrap_or(defaults.market_refinance_rate),
        target_refinance_ltv: cli.refinance_ltv,
        refinance_term_years: cli.refinance_term,
        ..defaults
    };

    let result = strategy_projection(&inputs, cli.horizon)?;
    let rows = marginal_roe(&result, &policy);
    let break_even = break_even_year(&rows);

    let year = cli.year.unwrap_or(inputs.holding_period).clamp(1, cli.horizon.max(1));
    let decision = evaluate_decision_year(
        &inputs,
        &result,
        &policy,
        year,
        cli.price,
        cli.wealth_years,
    )?;

    let optimal = if cli.optimize {
        Some(ScenarioRunner::new(inputs.clone())?.optimize_strategy(&OptimizerConfig::default())?)
    } else {
        None
    };

    if cli.json {
        let response = serde_json::json!({
            "policy": policy,
            "marginal_roe": rows,
            "break_even_year": break_even,
            "decision": decision,
            "optimal": optimal,
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Strategy over {} years (benchmark {:.2}%)", cli.horizon, policy.benchmark_rate);
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>10} {:>10}",
        "Year", "Value", "Debt", "Net equity", "Marg ROE", "Gap"
    );
    println!("{}", "-".repeat(72));
    for row in &rows {
        println!(
            "{:>4} {:>14.0} {:>14.0} {:>14.0} {:>9.2}% {:>+10.2}",
            row.year,
            row.property_value,
            row.loan_balance,
            row.net_equity,
            row.marginal_roe,
            row.gap
        );
    }

    match break_even {
        Some(year) => println!("\nHolding stops beating the benchmark in year {}", year),
        None => println!("\nHolding beats the benchmark over the whole horizon"),
    }

    let liquidation = &decision.liquidation;
    println!(
        "\nDecision at year {} (price {:.0}, model {:.0}):",
        decision.year, decision.price, decision.model_price
    );
    println!("  Sell:");
    println!("    Sale costs:            {:>14.0}", liquidation.sale_costs);
    println!("    Capital gains tax:     {:>14.0}", liquidation.capital_gains_tax);
    println!("    Net liquidation value: {:>14.0}", liquidation.net_liquidation_value);
    println!(
        "  Refinance to {:.0}% LTV at {:.2}%:",
        policy.target_refinance_ltv, policy.market_refinance_rate
    );
    if liquidation.refinance_cash_out > 0.0 {
        println!("    New loan:              {:>14.0}", liquidation.new_loan_amount);
        println!("    Cash out:              {:>14.0}", liquidation.refinance_cash_out);
        println!("    Arbitrage per year:    {:>14.0}", liquidation.refinance_arbitrage_per_year);
        println!(
            "    New monthly payment:   {:>14.0} ({:+.0})",
            liquidation.refinanced_monthly_payment, liquidation.payment_change
        );
    } else {
        println!("    No equity to release at this LTV");
    }

    println!("\n  Net worth, hold vs sell:");
    for row in &decision.wealth {
        println!(
            "    +{:>2}y {:>14.0} {:>14.0}",
            row.year, row.net_worth_if_held, row.net_worth_if_sold
        );
    }

    if let Some(best) = optimal {
        println!(
            "\nBest IRR {:.2}% at LTV {:.0}% held {} years",
            best.irr, best.loan_to_value, best.holding_period
        );
    }

    Ok(())
}
