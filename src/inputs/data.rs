//! Scenario input structures matching the investment calculator form

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A market rate given either once for the whole horizon or year by year (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateInput {
    /// Same rate applied to every projection year
    Constant(f64),
    /// One rate per projection year, index 0 = year 1
    PerYear(Vec<f64>),
}

impl RateInput {
    /// Resolve to exactly `years` per-year rates.
    ///
    /// Shorter sequences repeat their last element; an empty sequence resolves to 0.
    pub fn resolve(&self, years: u32) -> Vec<f64> {
        let years = years as usize;
        match self {
            RateInput::Constant(rate) => vec![*rate; years],
            RateInput::PerYear(rates) => {
                if rates.len() < years && !rates.is_empty() {
                    log::warn!(
                        "per-year rate sequence has {} entries for {} years, repeating last",
                        rates.len(),
                        years
                    );
                } else if rates.len() > years {
                    log::warn!(
                        "per-year rate sequence has {} entries for {} years, extra ignored",
                        rates.len(),
                        years
                    );
                }
                let last = rates.last().copied().unwrap_or(0.0);
                (0..years)
                    .map(|i| rates.get(i).copied().unwrap_or(last))
                    .collect()
            }
        }
    }

    /// Average rate; a constant returns its value exactly
    pub fn mean(&self) -> f64 {
        match self {
            RateInput::Constant(rate) => *rate,
            RateInput::PerYear(rates) if rates.is_empty() => 0.0,
            RateInput::PerYear(rates) => rates.iter().sum::<f64>() / rates.len() as f64,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            RateInput::Constant(rate) => rate.is_finite(),
            RateInput::PerYear(rates) => rates.iter().all(|r| r.is_finite()),
        }
    }
}

impl Default for RateInput {
    fn default() -> Self {
        RateInput::Constant(0.0)
    }
}

impl From<f64> for RateInput {
    fn from(rate: f64) -> Self {
        RateInput::Constant(rate)
    }
}

impl From<Vec<f64>> for RateInput {
    fn from(rates: Vec<f64>) -> Self {
        RateInput::PerYear(rates)
    }
}

/// How a gain on sale is taxed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum CapitalGainsPolicy {
    /// Individual owner: gain exempt once held for at least `exempt_after_years`
    TimeTest { exempt_after_years: u32 },
    /// Every positive gain is taxed (e.g. company-owned property)
    AlwaysTax,
    /// Gains are never taxed
    NeverTax,
}

impl CapitalGainsPolicy {
    /// Build from the legacy `{enabled, years}` form field pair.
    ///
    /// Follows the form's radio semantics: a disabled time test means the
    /// owner is exempt, so it maps to `NeverTax`, not `AlwaysTax`.
    pub fn from_time_test(enabled: bool, years: u32) -> Self {
        if enabled {
            CapitalGainsPolicy::TimeTest {
                exempt_after_years: years,
            }
        } else {
            CapitalGainsPolicy::NeverTax
        }
    }

    /// Whether a positive gain realised after `years_held` is taxable
    pub fn is_taxable(&self, years_held: u32) -> bool {
        match self {
            CapitalGainsPolicy::TimeTest { exempt_after_years } => years_held < *exempt_after_years,
            CapitalGainsPolicy::AlwaysTax => true,
            CapitalGainsPolicy::NeverTax => false,
        }
    }
}

impl Default for CapitalGainsPolicy {
    fn default() -> Self {
        CapitalGainsPolicy::TimeTest {
            exempt_after_years: 10,
        }
    }
}

/// Complete set of inputs for one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInputs {
    /// Purchase price of the property
    pub purchase_price: f64,

    /// Own cash paid towards the price; the rest is borrowed
    pub down_payment: f64,

    /// One-off acquisition costs (agent, legal, refurbishment)
    pub one_off_costs: f64,

    /// Mortgage interest rate (% p.a.)
    pub interest_rate: f64,

    /// Mortgage term in years
    pub loan_term_years: u32,

    /// Monthly rent at purchase
    pub monthly_rent: f64,

    /// Monthly operating expenses at purchase (service charge, insurance, management)
    pub monthly_expenses: f64,

    /// Average months per year without a tenant
    pub vacancy_months: f64,

    /// Income tax rate (%), also applied to taxable capital gains
    pub tax_rate: f64,

    /// Property appreciation (% p.a.)
    pub appreciation_rate: RateInput,

    /// Growth of rent and expenses (% p.a.), applied from year 2
    pub rent_growth_rate: RateInput,

    /// Holding period in whole years
    pub holding_period: u32,

    /// Whether to simulate the index-fund benchmark
    pub benchmark_enabled: bool,

    /// Expected benchmark return (% p.a.) in its own currency
    pub benchmark_return: RateInput,

    /// Home currency units per unit of benchmark currency at purchase
    pub initial_fx_rate: f64,

    /// Annual drift of the FX rate (%); positive strengthens the benchmark currency
    pub fx_drift: f64,

    /// Capital gains taxation on sale
    pub capital_gains: CapitalGainsPolicy,

    /// Transaction costs on sale (% of sale price)
    pub sale_fee_percent: f64,

    /// General inflation used to deflate nominal series (% p.a.)
    pub general_inflation_rate: f64,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            purchase_price: 5_000_000.0,
            down_payment: 1_000_000.0, // LTV 80 %
            one_off_costs: 150_000.0,
            interest_rate: 5.4,
            loan_term_years: 30,
            monthly_rent: 18_000.0,
            monthly_expenses: 3_500.0,
            vacancy_months: 1.0,
            tax_rate: 15.0,
            appreciation_rate: RateInput::Constant(3.0),
            rent_growth_rate: RateInput::Constant(2.0),
            holding_period: 10,
            benchmark_enabled: true,
            benchmark_return: RateInput::Constant(8.0),
            initial_fx_rate: 25.0,
            fx_drift: 0.0,
            capital_gains: CapitalGainsPolicy::default(),
            sale_fee_percent: 3.0,
            general_inflation_rate: 2.0,
        }
    }
}

impl ScenarioInputs {
    /// Set the down payment so that the loan covers `ltv_percent` of the price
    pub fn with_loan_to_value(mut self, ltv_percent: f64) -> Self {
        self.down_payment = self.purchase_price * (1.0 - ltv_percent / 100.0);
        self
    }

    pub fn with_holding_period(mut self, years: u32) -> Self {
        self.holding_period = years;
        self
    }

    /// Mortgage principal at purchase
    pub fn loan_amount(&self) -> f64 {
        (self.purchase_price - self.down_payment).max(0.0)
    }

    /// Loan-to-value at purchase (%)
    pub fn loan_to_value(&self) -> f64 {
        if self.purchase_price > 0.0 {
            self.loan_amount() / self.purchase_price * 100.0
        } else {
            0.0
        }
    }

    /// Own cash put in at purchase: down payment plus one-off costs
    pub fn initial_investment(&self) -> f64 {
        self.down_payment + self.one_off_costs
    }

    /// Purchase price plus one-off costs, the cost basis for capital gains
    pub fn acquisition_cost(&self) -> f64 {
        self.purchase_price + self.one_off_costs
    }

    /// Check structural validity.
    ///
    /// Numeric degeneracies such as a zero price or a zero initial investment
    /// are not errors; the engine guards them.
    pub fn validate(&self) -> ModelResult<()> {
        if self.holding_period == 0 {
            return Err(ModelError::invalid(
                "holding_period",
                "holding period must be at least 1 year",
            ));
        }

        let amounts = [
            ("purchase_price", self.purchase_price),
            ("down_payment", self.down_payment),
            ("one_off_costs", self.one_off_costs),
            ("monthly_rent", self.monthly_rent),
            ("monthly_expenses", self.monthly_expenses),
            ("interest_rate", self.interest_rate),
            ("tax_rate", self.tax_rate),
            ("sale_fee_percent", self.sale_fee_percent),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::invalid(field, "must be a finite, non-negative number"));
            }
        }

        for (field, value) in [
            ("fx_drift", self.fx_drift),
            ("general_inflation_rate", self.general_inflation_rate),
        ] {
            if !value.is_finite() {
                return Err(ModelError::invalid(field, "must be a finite number"));
            }
        }

        if !(0.0..=12.0).contains(&self.vacancy_months) {
            return Err(ModelError::invalid(
                "vacancy_months",
                "vacancy must be between 0 and 12 months",
            ));
        }

        if self.loan_amount() > 0.0 && self.loan_term_years == 0 {
            return Err(ModelError::invalid(
                "loan_term_years",
                "a mortgage needs a term of at least 1 year",
            ));
        }

        for (field, rate) in [
            ("appreciation_rate", &self.appreciation_rate),
            ("rent_growth_rate", &self.rent_growth_rate),
            ("benchmark_return", &self.benchmark_return),
        ] {
            if !rate.is_finite() {
                return Err(ModelError::invalid(field, "rates must be finite"));
            }
        }

        let fx_valid = self.initial_fx_rate.is_finite() && self.initial_fx_rate > 0.0;
        if self.benchmark_enabled && !fx_valid {
            return Err(ModelError::invalid(
                "initial_fx_rate",
                "FX rate must be positive when the benchmark is enabled",
            ));
        }

        Ok(())
    }

    /// Serialize a single scenario for export
    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a single exported scenario; missing fields take default values
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a single exported scenario from disk
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> ModelResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_rate_resolves_to_every_year() {
        let rates = RateInput::Constant(3.0).resolve(4);
        assert_eq!(rates, vec![3.0; 4]);
    }

    #[test]
    fn test_short_sequence_repeats_last_element() {
        let rates = RateInput::PerYear(vec![1.0, 2.0]).resolve(5);
        assert_eq!(rates, vec![1.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_long_sequence_is_truncated() {
        let rates = RateInput::PerYear(vec![1.0, 2.0, 3.0]).resolve(2);
        assert_eq!(rates, vec![1.0, 2.0]);
    }

    #[test]
    fn test_empty_sequence_resolves_to_zero() {
        let rates = RateInput::PerYear(Vec::new()).resolve(3);
        assert_eq!(rates, vec![0.0; 3]);
        assert_eq!(RateInput::PerYear(Vec::new()).mean(), 0.0);
    }

    #[test]
    fn test_rate_input_deserializes_scalar_or_array() {
        let scalar: RateInput = serde_json::from_str("4.5").unwrap();
        assert_eq!(scalar, RateInput::Constant(4.5));

        let seq: RateInput = serde_json::from_str("[1.0, 2.5]").unwrap();
        assert_eq!(seq, RateInput::PerYear(vec![1.0, 2.5]));
    }

    #[test]
    fn test_time_test_gate() {
        let policy = CapitalGainsPolicy::TimeTest { exempt_after_years: 10 };
        assert!(policy.is_taxable(9));
        assert!(!policy.is_taxable(10));
        assert!(!policy.is_taxable(15));

        assert!(CapitalGainsPolicy::AlwaysTax.is_taxable(50));
        assert!(!CapitalGainsPolicy::NeverTax.is_taxable(1));
        assert_eq!(CapitalGainsPolicy::from_time_test(false, 10), CapitalGainsPolicy::NeverTax);
    }

    #[test]
    fn test_loan_to_value_builder() {
        let inputs = ScenarioInputs::default().with_loan_to_value(60.0);
        assert!((inputs.down_payment - 2_000_000.0).abs() < 1e-6);
        assert!((inputs.loan_amount() - 3_000_000.0).abs() < 1e-6);
        assert!((inputs.loan_to_value() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_price_ltv_is_guarded() {
        let inputs = ScenarioInputs {
            purchase_price: 0.0,
            down_payment: 0.0,
            ..Default::default()
        };
        assert_eq!(inputs.loan_to_value(), 0.0);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_structural_errors() {
        let zero_years = ScenarioInputs::default().with_holding_period(0);
        assert!(matches!(
            zero_years.validate(),
            Err(ModelError::InvalidInput { ref field, .. }) if field == "holding_period"
        ));

        let no_term = ScenarioInputs {
            loan_term_years: 0,
            ..Default::default()
        };
        assert!(no_term.validate().is_err());

        let too_vacant = ScenarioInputs {
            vacancy_months: 13.0,
            ..Default::default()
        };
        assert!(too_vacant.validate().is_err());

        let bad_fx = ScenarioInputs {
            initial_fx_rate: 0.0,
            ..Default::default()
        };
        assert!(bad_fx.validate().is_err());

        let bad_rate = ScenarioInputs {
            appreciation_rate: RateInput::PerYear(vec![1.0, f64::NAN]),
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let inputs = ScenarioInputs::from_json(
            r#"{"purchase_price": 4000000, "capital_gains": {"mode": "AlwaysTax"}}"#,
        )
        .unwrap();
        assert_eq!(inputs.purchase_price, 4_000_000.0);
        assert_eq!(inputs.capital_gains, CapitalGainsPolicy::AlwaysTax);
        assert_eq!(inputs.holding_period, 10);
        assert_eq!(inputs.monthly_rent, 18_000.0);
    }
}
