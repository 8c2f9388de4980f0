//! Core year-by-year projection of a leveraged rental property and its benchmark

use super::amortization::LoanState;
use super::cashflows::{ProjectionResult, ProjectionSeries, YearRecord};
use super::irr::irr_percent;
use super::sale::{liquidate, SaleTerms};
use crate::error::ModelResult;
use crate::inputs::ScenarioInputs;

/// Market rates resolved to one value per projection year (percent)
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRates {
    pub appreciation: Vec<f64>,
    pub rent_growth: Vec<f64>,
    pub benchmark_return: Vec<f64>,
}

impl ResolvedRates {
    pub fn from_inputs(inputs: &ScenarioInputs) -> Self {
        let years = inputs.holding_period;
        Self {
            appreciation: inputs.appreciation_rate.resolve(years),
            rent_growth: inputs.rent_growth_rate.resolve(years),
            benchmark_return: inputs.benchmark_return.resolve(years),
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    inputs: ScenarioInputs,
    rates: ResolvedRates,
}

impl ProjectionEngine {
    /// Validate the inputs and resolve every rate input to a per-year array
    pub fn new(inputs: ScenarioInputs) -> ModelResult<Self> {
        inputs.validate()?;
        let rates = ResolvedRates::from_inputs(&inputs);
        Ok(Self { inputs, rates })
    }

    pub fn inputs(&self) -> &ScenarioInputs {
        &self.inputs
    }

    pub fn rates(&self) -> &ResolvedRates {
        &self.rates
    }

    /// Run the projection over the holding period
    pub fn project(&self) -> ProjectionResult {
        let inputs = &self.inputs;
        let holding_period = inputs.holding_period;
        let initial_investment = inputs.initial_investment();
        let loan_amount = inputs.loan_amount();
        let loan = LoanState::new(loan_amount, inputs.interest_rate, inputs.loan_term_years);
        let annual_payment = loan.annual_payment();

        let mut years = Vec::with_capacity(holding_period as usize);
        let mut cashflow_vector = Vec::with_capacity(holding_period as usize + 1);
        cashflow_vector.push(-initial_investment);

        let benchmark = inputs.benchmark_enabled;
        let mut benchmark_cashflow_vector = Vec::new();
        let mut benchmark_balance = 0.0; // foreign currency
        if benchmark {
            benchmark_balance = to_foreign(initial_investment, inputs.initial_fx_rate);
            benchmark_cashflow_vector.push(-initial_investment);
        }

        let mut property_value = inputs.purchase_price;
        let mut monthly_rent = inputs.monthly_rent;
        let mut monthly_expenses = inputs.monthly_expenses;
        let mut loan_balance = loan.principal;

        for year in 1..=holding_period {
            let idx = (year - 1) as usize;
            let mut record = YearRecord::new(year);

            property_value *= 1.0 + self.rates.appreciation[idx] / 100.0;

            // Year 1 is the as-is baseline
            if year > 1 {
                let growth = 1.0 + self.rates.rent_growth[idx] / 100.0;
                monthly_rent *= growth;
                monthly_expenses *= growth;
            }

            let gross_rent = monthly_rent * (12.0 - inputs.vacancy_months);
            let expenses = monthly_expenses * 12.0;

            // Start-of-year balance times the annual rate, not a monthly schedule
            let interest_for_tax = loan_balance * inputs.interest_rate / 100.0;
            let taxable_income = gross_rent - expenses - interest_for_tax;
            let tax_paid = (taxable_income * inputs.tax_rate / 100.0).max(0.0);

            let operating_cashflow = gross_rent - annual_payment - expenses - tax_paid;

            loan_balance = loan.balance_after(year * 12);

            if benchmark {
                let fx = inputs.initial_fx_rate * (1.0 + inputs.fx_drift / 100.0).powi(year as i32);
                benchmark_balance *= 1.0 + self.rates.benchmark_return[idx] / 100.0;

                let contribution = if operating_cashflow < 0.0 {
                    -operating_cashflow
                } else {
                    0.0
                };
                benchmark_balance += to_foreign(contribution, fx);

                record.benchmark_value = benchmark_balance * fx;
                record.benchmark_contribution = contribution;
                benchmark_cashflow_vector.push(-contribution);
            }

            record.property_value = property_value;
            record.loan_balance = loan_balance;
            record.gross_rent = gross_rent;
            record.expenses = expenses;
            record.interest_for_tax = interest_for_tax;
            record.tax_paid = tax_paid;
            record.operating_cashflow = operating_cashflow;

            cashflow_vector.push(operating_cashflow);
            years.push(record);
        }

        let terms = SaleTerms::from_inputs(inputs);
        let final_value = years.last().map(|y| y.property_value).unwrap_or(property_value);
        let sale = liquidate(&terms, final_value, loan_balance, holding_period);
        if let Some(last) = cashflow_vector.last_mut() {
            *last += sale.net_proceeds;
        }

        let total_profit: f64 = cashflow_vector.iter().sum();
        let irr = irr_percent(&cashflow_vector);

        let benchmark_irr = if benchmark {
            let final_benchmark = years.last().map(|y| y.benchmark_value).unwrap_or(0.0);
            if let Some(last) = benchmark_cashflow_vector.last_mut() {
                *last += final_benchmark;
            }
            irr_percent(&benchmark_cashflow_vector)
        } else {
            0.0
        };

        let (year1_monthly_cashflow, year1_tax_paid) = years
            .first()
            .map(|y| (y.operating_cashflow / 12.0, y.tax_paid))
            .unwrap_or((0.0, 0.0));

        let series = build_series(
            &years,
            cashflow_vector,
            benchmark,
            benchmark_cashflow_vector,
            inputs.general_inflation_rate,
        );

        log::debug!(
            "projected {} years: irr {:.2}%, benchmark irr {:.2}%, profit {:.0}",
            holding_period,
            irr,
            benchmark_irr,
            total_profit
        );

        ProjectionResult {
            irr,
            total_profit,
            benchmark_irr,
            year1_monthly_cashflow,
            year1_tax_paid,
            capital_gains_tax: sale.capital_gains_tax,
            initial_investment,
            initial_loan_amount: loan_amount,
            purchase_price: inputs.purchase_price,
            benchmark_enabled: benchmark,
            loan,
            sale,
            years,
            series,
        }
    }
}

/// Convert a home-currency amount at `fx` home units per foreign unit
fn to_foreign(amount: f64, fx: f64) -> f64 {
    if fx > 0.0 {
        amount / fx
    } else {
        0.0
    }
}

fn build_series(
    years: &[YearRecord],
    cashflow_vector: Vec<f64>,
    benchmark: bool,
    benchmark_cashflow_vector: Vec<f64>,
    inflation_rate: f64,
) -> ProjectionSeries {
    let deflators: Vec<f64> = years
        .iter()
        .map(|y| (1.0 + inflation_rate / 100.0).powi(y.year as i32))
        .collect();
    let real = |values: &[f64]| -> Vec<f64> {
        values
            .iter()
            .zip(&deflators)
            .map(|(value, deflator)| if *deflator != 0.0 { value / deflator } else { 0.0 })
            .collect()
    };

    let property_values: Vec<f64> = years.iter().map(|y| y.property_value).collect();
    let loan_balances: Vec<f64> = years.iter().map(|y| y.loan_balance).collect();
    let operating_cashflows: Vec<f64> = years.iter().map(|y| y.operating_cashflow).collect();
    let benchmark_values: Vec<f64> = if benchmark {
        years.iter().map(|y| y.benchmark_value).collect()
    } else {
        Vec::new()
    };

    ProjectionSeries {
        real_property_values: real(&property_values),
        real_loan_balances: real(&loan_balances),
        real_operating_cashflows: real(&operating_cashflows),
        real_benchmark_values: real(&benchmark_values),
        property_values,
        loan_balances,
        operating_cashflows,
        cashflow_vector,
        benchmark_values,
        benchmark_cashflow_vector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{CapitalGainsPolicy, RateInput};
    use approx::assert_abs_diff_eq;

    fn cash_purchase() -> ScenarioInputs {
        ScenarioInputs {
            purchase_price: 5_000_000.0,
            down_payment: 5_000_000.0,
            one_off_costs: 0.0,
            monthly_rent: 20_000.0,
            monthly_expenses: 5_000.0,
            vacancy_months: 0.0,
            tax_rate: 0.0,
            holding_period: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_inputs() {
        let inputs = ScenarioInputs::default().with_holding_period(0);
        assert!(ProjectionEngine::new(inputs).is_err());
    }

    #[test]
    fn test_series_lengths() {
        let result = ProjectionEngine::new(ScenarioInputs::default()).unwrap().project();
        assert_eq!(result.series.property_values.len(), 10);
        assert_eq!(result.series.loan_balances.len(), 10);
        assert_eq!(result.series.cashflow_vector.len(), 11);
        assert_eq!(result.series.benchmark_values.len(), 10);
        assert_eq!(result.series.benchmark_cashflow_vector.len(), 11);
        assert_eq!(result.series.real_property_values.len(), 10);
    }

    #[test]
    fn test_no_loan_cashflow() {
        let result = ProjectionEngine::new(cash_purchase()).unwrap().project();
        assert_abs_diff_eq!(result.year1_monthly_cashflow, 15_000.0, epsilon = 1e-9);
        assert_eq!(result.initial_loan_amount, 0.0);
        assert_eq!(result.loan.monthly_payment, 0.0);
    }

    #[test]
    fn test_out_of_range_irr_reports_zero() {
        // Fully financed with a token stake: the true IRR is far above 1000%
        let inputs = ScenarioInputs {
            down_payment: 0.0,
            one_off_costs: 1_000.0,
            monthly_rent: 40_000.0,
            holding_period: 1,
            ..Default::default()
        };
        let result = ProjectionEngine::new(inputs).unwrap().project();
        assert_eq!(result.series.cashflow_vector[0], -1_000.0);
        assert!(result.series.cashflow_vector[1] > 11.0 * 1_000.0);
        assert_eq!(result.irr, 0.0);
    }

    #[test]
    fn test_rent_growth_starts_in_year_two() {
        let inputs = ScenarioInputs {
            rent_growth_rate: RateInput::Constant(10.0),
            holding_period: 2,
            ..cash_purchase()
        };
        let result = ProjectionEngine::new(inputs).unwrap().project();
        assert_abs_diff_eq!(result.years[0].gross_rent, 240_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.years[1].gross_rent, 264_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.years[1].expenses, 66_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_interest_uses_start_of_year_balance() {
        let inputs = ScenarioInputs::default().with_holding_period(3);
        let result = ProjectionEngine::new(inputs.clone()).unwrap().project();
        assert_abs_diff_eq!(
            result.years[0].interest_for_tax,
            inputs.loan_amount() * inputs.interest_rate / 100.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            result.years[1].interest_for_tax,
            result.years[0].loan_balance * inputs.interest_rate / 100.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_benchmark_tops_up_shortfalls() {
        // Rent does not cover the mortgage, so every year is a shortfall
        let inputs = ScenarioInputs {
            monthly_rent: 10_000.0,
            fx_drift: 1.0,
            holding_period: 3,
            ..Default::default()
        };
        let result = ProjectionEngine::new(inputs.clone()).unwrap().project();
        for (i, year) in result.years.iter().enumerate() {
            assert!(year.operating_cashflow < 0.0);
            assert_abs_diff_eq!(
                year.benchmark_contribution,
                -year.operating_cashflow,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                result.series.benchmark_cashflow_vector[i + 1],
                if i == 2 {
                    year.operating_cashflow + year.benchmark_value
                } else {
                    year.operating_cashflow
                },
                epsilon = 1e-6
            );
        }

        // Replay the foreign-currency balance by hand
        let mut balance = inputs.initial_investment() / inputs.initial_fx_rate;
        for year in &result.years {
            let fx = inputs.initial_fx_rate * 1.01_f64.powi(year.year as i32);
            balance = balance * 1.08 + year.benchmark_contribution / fx;
            assert_abs_diff_eq!(year.benchmark_value, balance * fx, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_disabled_benchmark_is_empty() {
        let inputs = ScenarioInputs {
            benchmark_enabled: false,
            initial_fx_rate: 0.0,
            ..Default::default()
        };
        let result = ProjectionEngine::new(inputs).unwrap().project();
        assert!(result.series.benchmark_values.is_empty());
        assert!(result.series.benchmark_cashflow_vector.is_empty());
        assert!(result.series.real_benchmark_values.is_empty());
        assert_eq!(result.benchmark_irr, 0.0);
    }

    #[test]
    fn test_sale_proceeds_fold_into_last_entry() {
        let inputs = ScenarioInputs {
            capital_gains: CapitalGainsPolicy::AlwaysTax,
            ..Default::default()
        };
        let result = ProjectionEngine::new(inputs).unwrap().project();
        let last = result.years.last().unwrap();
        assert_abs_diff_eq!(
            result.series.cashflow_vector[10],
            last.operating_cashflow + result.sale.net_proceeds,
            epsilon = 1e-6
        );
        assert!(result.capital_gains_tax > 0.0);
        assert_abs_diff_eq!(
            result.total_profit,
            result.series.cashflow_vector.iter().sum::<f64>(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_real_series_deflated() {
        let result = ProjectionEngine::new(ScenarioInputs::default()).unwrap().project();
        for (i, (nominal, real)) in result
            .series
            .property_values
            .iter()
            .zip(&result.series.real_property_values)
            .enumerate()
        {
            assert_abs_diff_eq!(*real, nominal / 1.02_f64.powi(i as i32 + 1), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let engine = ProjectionEngine::new(ScenarioInputs::default()).unwrap();
        assert_eq!(engine.project(), engine.project());
    }
}
