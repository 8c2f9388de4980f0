//! Fixed-rate, fixed-term loan arithmetic

use serde::{Deserialize, Serialize};

/// Monthly payment and monthly rate for a fully amortizing loan.
///
/// Returns `(0, 0)` when there is nothing borrowed.
pub fn compute_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> (f64, f64) {
    if principal <= 0.0 {
        return (0.0, 0.0);
    }
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let n = (term_years * 12) as f64;
    if n <= 0.0 {
        return (0.0, monthly_rate);
    }
    if monthly_rate == 0.0 {
        return (principal / n, 0.0);
    }
    let payment = principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-n));
    (payment, monthly_rate)
}

/// Balance left after `elapsed_months` payments, clamped at zero.
///
/// Callers treat the balance as 0 once the full term has elapsed.
pub fn remaining_balance(
    current_balance: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    elapsed_months: u32,
) -> f64 {
    let n = elapsed_months as f64;
    let balance = if monthly_rate == 0.0 {
        current_balance - monthly_payment * n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        current_balance * growth - monthly_payment * (growth - 1.0) / monthly_rate
    };
    balance.max(0.0)
}

/// A loan as originated, with its fixed payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub principal: f64,
    /// Nominal annual rate (%)
    pub annual_rate: f64,
    pub monthly_rate: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
}

impl LoanState {
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        let (monthly_payment, monthly_rate) =
            compute_payment(principal, annual_rate_percent, term_years);
        Self {
            principal: principal.max(0.0),
            annual_rate: annual_rate_percent,
            monthly_rate,
            term_months: term_years * 12,
            monthly_payment,
        }
    }

    pub fn annual_payment(&self) -> f64 {
        self.monthly_payment * 12.0
    }

    /// Balance after `elapsed_months`, recomputed from the original schedule
    pub fn balance_after(&self, elapsed_months: u32) -> f64 {
        if self.principal <= 0.0 || elapsed_months >= self.term_months {
            return 0.0;
        }
        remaining_balance(
            self.principal,
            self.monthly_rate,
            self.monthly_payment,
            elapsed_months,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_standard_mortgage_payment() {
        // 4M at 5.4 % over 30 years
        let (payment, rate) = compute_payment(4_000_000.0, 5.4, 30);
        assert_relative_eq!(rate, 0.0045, epsilon = 1e-12);
        assert_abs_diff_eq!(payment, 22_461.23, epsilon = 0.01);
    }

    #[test]
    fn test_zero_interest_payment_is_straight_line() {
        let (payment, rate) = compute_payment(360_000.0, 0.0, 30);
        assert_eq!(payment, 1_000.0);
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_no_principal() {
        assert_eq!(compute_payment(0.0, 5.0, 30), (0.0, 0.0));
        assert_eq!(compute_payment(-10.0, 5.0, 30), (0.0, 0.0));
    }

    #[test]
    fn test_balance_reaches_zero_at_term() {
        let loan = LoanState::new(1_000_000.0, 4.0, 20);
        let almost =
            remaining_balance(loan.principal, loan.monthly_rate, loan.monthly_payment, 240);
        assert_abs_diff_eq!(almost, 0.0, epsilon = 1e-4);
        assert_eq!(loan.balance_after(240), 0.0);
        assert_eq!(loan.balance_after(500), 0.0);
    }

    #[test]
    fn test_balance_declines() {
        let loan = LoanState::new(2_000_000.0, 6.0, 25);
        let mut prior = loan.principal;
        for year in 1..=25 {
            let balance = loan.balance_after(year * 12);
            assert!(balance <= prior);
            prior = balance;
        }
    }

    #[test]
    fn test_overpayment_is_clamped() {
        assert_eq!(remaining_balance(1_000.0, 0.01, 5_000.0, 12), 0.0);
    }
}
