//! Internal Rate of Return (IRR) calculation
//!
//! Reduces an annual cashflow vector (entry 0 undiscounted) to a yearly rate.

const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;
const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Annual IRR of yearly cashflows using Newton-Raphson with a bisection
/// fallback.
///
/// Returns the rate as a decimal (0.05 for 5%), or `None` when the vector has
/// no sign change or no root lies in `[-99%, 1000%]`.
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // A root needs at least one sign change
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = 0.05;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if !npv.is_finite() || !dnpv.is_finite() || dnpv.abs() < 1e-20 {
            return calculate_irr_bisection(cashflows);
        }

        let new_rate = (rate - npv / dnpv).clamp(MIN_RATE, MAX_RATE);

        if (new_rate - rate).abs() < TOLERANCE {
            // A step pinned to a clamp bound is only an answer if it is a root
            let on_bound = new_rate <= MIN_RATE || new_rate >= MAX_RATE;
            if on_bound && !is_root(cashflows, new_rate) {
                return calculate_irr_bisection(cashflows);
            }
            return Some(new_rate);
        }

        rate = new_rate;
    }

    calculate_irr_bisection(cashflows)
}

/// IRR in percent, with 0 standing in for "no solution".
///
/// Degenerate vectors (no sign change, all zero after the outlay, runaway
/// iterations) are expected from extreme scenarios and never surface NaN.
pub fn irr_percent(cashflows: &[f64]) -> f64 {
    match calculate_irr(cashflows) {
        Some(rate) if rate.is_finite() => rate * 100.0,
        Some(rate) => {
            log::debug!("IRR solver returned non-finite rate {}, using 0", rate);
            0.0
        }
        None => {
            log::debug!("IRR has no solution for {} cashflows, using 0", cashflows.len());
            0.0
        }
    }
}

/// NPV of `cashflows` at a periodic rate
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV small relative to the largest cashflow
fn is_root(cashflows: &[f64], rate: f64) -> bool {
    let scale = cashflows.iter().fold(1.0_f64, |acc, cf| acc.max(cf.abs()));
    let value = npv(cashflows, rate);
    value.is_finite() && value.abs() <= 1e-8 * scale
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        value += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            derivative -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, derivative)
}

fn calculate_irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;

    let mut npv_low = npv(cashflows, low);
    let npv_high = npv(cashflows, high);

    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // 1000 in, 1100 back after a year
        let irr = calculate_irr(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_lump_sum_compounding() {
        let initial = 1_000_000.0;
        let final_value = initial * 1.08_f64.powi(10);
        let mut cashflows = vec![-initial];
        cashflows.extend(vec![0.0; 9]);
        cashflows.push(final_value);

        assert_abs_diff_eq!(irr_percent(&cashflows), 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_level_annuity() {
        // 10000 lent, 5 annual payments of 2500
        let irr = calculate_irr(&[-10_000.0, 2_500.0, 2_500.0, 2_500.0, 2_500.0, 2_500.0]);
        let irr = irr.unwrap();
        assert!(irr > 0.07 && irr < 0.08, "got {}", irr);
        assert_abs_diff_eq!(
            npv(&[-10_000.0, 2_500.0, 2_500.0, 2_500.0, 2_500.0, 2_500.0], irr),
            0.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_negative_return() {
        let irr = irr_percent(&[-1000.0, 500.0]);
        assert_abs_diff_eq!(irr, -50.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change_falls_back_to_zero() {
        assert_eq!(calculate_irr(&[1000.0, 200.0, 300.0]), None);
        assert_eq!(irr_percent(&[1000.0, 200.0, 300.0]), 0.0);
        assert_eq!(irr_percent(&[-1000.0, -5.0, -5.0]), 0.0);
        assert_eq!(irr_percent(&[-1000.0, 0.0, 0.0]), 0.0);
        assert_eq!(irr_percent(&[]), 0.0);
    }

    #[test]
    fn test_all_zero_is_zero() {
        assert_eq!(calculate_irr(&[0.0, 0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_root_beyond_upper_bound_is_not_reported() {
        // True IRR is 9900%, far outside the search range
        assert_eq!(calculate_irr(&[-1.0, 100.0]), None);
        assert_eq!(irr_percent(&[-1.0, 100.0]), 0.0);
    }

    #[test]
    fn test_root_below_lower_bound_is_not_reported() {
        // True IRR is -99.9%
        assert_eq!(calculate_irr(&[-1000.0, 1.0]), None);
        assert_eq!(irr_percent(&[-1000.0, 1.0]), 0.0);
    }

    #[test]
    fn test_reported_rate_is_a_root() {
        for cashflows in [
            vec![-1000.0, 105_981.33],
            vec![-1000.0, 1.0],
            vec![-1.0, 10.5],
            vec![-5_000.0, 200.0, 200.0, 6_000.0],
        ] {
            if let Some(rate) = calculate_irr(&cashflows) {
                assert_abs_diff_eq!(npv(&cashflows, rate), 0.0, epsilon = 1e-4);
            }
        }
        // 950% sits inside the range and must still be found
        assert_abs_diff_eq!(calculate_irr(&[-1.0, 10.5]).unwrap(), 9.5, epsilon = 1e-8);
    }
}
