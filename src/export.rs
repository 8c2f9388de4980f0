//! Flatten a projection into one row per year and write it as CSV

use std::io::Write;

use serde::Serialize;

use crate::error::ModelResult;
use crate::projection::ProjectionResult;

/// One exported year. Benchmark columns are empty when the benchmark is off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRow {
    pub year: u32,
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
    pub operating_cashflow: f64,
    pub benchmark_value: Option<f64>,
    pub benchmark_contribution: Option<f64>,
}

/// Rows for a result, nominal or deflated to today's money.
///
/// The benchmark contribution is always nominal: it is the cash actually paid in.
pub fn year_rows(result: &ProjectionResult, real_terms: bool) -> Vec<YearRow> {
    let series = &result.series;
    let (values, balances, cashflows, benchmark) = if real_terms {
        (
            &series.real_property_values,
            &series.real_loan_balances,
            &series.real_operating_cashflows,
            &series.real_benchmark_values,
        )
    } else {
        (
            &series.property_values,
            &series.loan_balances,
            &series.operating_cashflows,
            &series.benchmark_values,
        )
    };

    result
        .years
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let property_value = values[i];
            let loan_balance = balances[i];
            YearRow {
                year: record.year,
                property_value,
                loan_balance,
                equity: property_value - loan_balance,
                operating_cashflow: cashflows[i],
                benchmark_value: benchmark.get(i).copied(),
                benchmark_contribution: result
                    .benchmark_enabled
                    .then_some(record.benchmark_contribution),
            }
        })
        .collect()
}

/// Write the year table with a header row
pub fn write_year_table<W: Write>(
    writer: W,
    result: &ProjectionResult,
    real_terms: bool,
) -> ModelResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in year_rows(result, real_terms) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
