//! Output structures for a single projection run

use serde::{Deserialize, Serialize};

use super::amortization::LoanState;
use super::sale::SaleOutcome;

/// One projection year (year 1 is the first year after purchase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,

    // Property
    pub property_value: f64,
    pub loan_balance: f64,

    // Operating line items
    pub gross_rent: f64,
    pub expenses: f64,
    pub interest_for_tax: f64,
    pub tax_paid: f64,
    pub operating_cashflow: f64,

    // Benchmark, home currency
    pub benchmark_value: f64,
    pub benchmark_contribution: f64,
}

impl YearRecord {
    pub fn new(year: u32) -> Self {
        Self {
            year,
            property_value: 0.0,
            loan_balance: 0.0,
            gross_rent: 0.0,
            expenses: 0.0,
            interest_for_tax: 0.0,
            tax_paid: 0.0,
            operating_cashflow: 0.0,
            benchmark_value: 0.0,
            benchmark_contribution: 0.0,
        }
    }

    /// Market value less outstanding debt
    pub fn equity(&self) -> f64 {
        self.property_value - self.loan_balance
    }
}

/// Per-year series in the shape charting and export collaborators consume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub property_values: Vec<f64>,
    pub loan_balances: Vec<f64>,
    pub operating_cashflows: Vec<f64>,
    /// Initial outlay, then yearly net flows; sale proceeds folded into the last entry
    pub cashflow_vector: Vec<f64>,
    pub benchmark_values: Vec<f64>,
    /// Initial outlay, then `-top-up` per year; final value folded into the last entry
    pub benchmark_cashflow_vector: Vec<f64>,

    // Deflated by general inflation
    pub real_property_values: Vec<f64>,
    pub real_loan_balances: Vec<f64>,
    pub real_operating_cashflows: Vec<f64>,
    pub real_benchmark_values: Vec<f64>,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Leveraged property IRR (%)
    pub irr: f64,

    /// Sum of the property cashflow vector
    pub total_profit: f64,

    /// Benchmark IRR (%), 0 when the benchmark is disabled
    pub benchmark_irr: f64,

    pub year1_monthly_cashflow: f64,
    pub year1_tax_paid: f64,
    pub capital_gains_tax: f64,
    pub initial_investment: f64,
    pub initial_loan_amount: f64,
    pub purchase_price: f64,
    pub benchmark_enabled: bool,

    /// Loan as originated
    pub loan: LoanState,

    /// Sale at the end of the holding period
    pub sale: SaleOutcome,

    pub years: Vec<YearRecord>,
    pub series: ProjectionSeries,
}

impl ProjectionResult {
    pub fn holding_period(&self) -> u32 {
        self.years.len() as u32
    }

    /// Derived dashboard metrics
    pub fn summary(&self) -> ProjectionSummary {
        let year1_annual_cashflow = self
            .series
            .operating_cashflows
            .first()
            .copied()
            .unwrap_or(0.0);
        let cumulative_operating_cashflow: f64 = self.series.operating_cashflows.iter().sum();
        let final_equity = self.years.last().map(|y| y.equity()).unwrap_or(0.0);

        let benchmark_final_value = self.series.benchmark_values.last().copied().unwrap_or(0.0);
        let benchmark_total_invested = if self.benchmark_enabled {
            self.initial_investment
                + self
                    .years
                    .iter()
                    .map(|y| y.benchmark_contribution)
                    .sum::<f64>()
        } else {
            0.0
        };
        let benchmark_profit = benchmark_final_value - benchmark_total_invested;

        ProjectionSummary {
            monthly_payment: self.loan.monthly_payment,
            loan_amount: self.initial_loan_amount,
            loan_to_value: percent_of(self.initial_loan_amount, self.purchase_price),
            cash_on_cash: percent_of(year1_annual_cashflow, self.initial_investment),
            roi: percent_of(self.total_profit, self.initial_investment),
            sale_price: self.sale.sale_price,
            sale_costs: self.sale.sale_costs,
            net_sale_proceeds: self.sale.net_proceeds,
            cumulative_operating_cashflow,
            final_equity,
            benchmark_final_value,
            benchmark_total_invested,
            benchmark_profit,
            benchmark_roi: percent_of(benchmark_profit, benchmark_total_invested),
            irr_spread: self.irr - self.benchmark_irr,
        }
    }
}

/// Headline metrics derived from a [`ProjectionResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub monthly_payment: f64,
    pub loan_amount: f64,
    pub loan_to_value: f64,
    /// Year-1 annual cashflow over initial investment (%)
    pub cash_on_cash: f64,
    /// Total profit over initial investment (%)
    pub roi: f64,
    pub sale_price: f64,
    pub sale_costs: f64,
    pub net_sale_proceeds: f64,
    pub cumulative_operating_cashflow: f64,
    pub final_equity: f64,
    pub benchmark_final_value: f64,
    pub benchmark_total_invested: f64,
    pub benchmark_profit: f64,
    pub benchmark_roi: f64,
    /// Property IRR minus benchmark IRR (percentage points)
    pub irr_spread: f64,
}

fn percent_of(value: f64, base: f64) -> f64 {
    if base != 0.0 {
        value / base * 100.0
    } else {
        0.0
    }
}
