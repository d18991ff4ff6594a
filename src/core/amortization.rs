use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    pub payment: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Amortization {
    pub payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationYear>,
}

/// Fixed payment that retires `principal` over `periods` at `rate_per_period`.
/// Zero rate falls back to straight division; zero periods pay nothing.
pub fn level_payment(principal: f64, rate_per_period: f64, periods: u32) -> f64 {
    if periods == 0 || principal <= 0.0 {
        return 0.0;
    }
    let n = periods as f64;
    if rate_per_period.abs() <= 1e-12 {
        return principal / n;
    }
    let growth = (1.0 + rate_per_period).powf(n);
    principal * rate_per_period * growth / (growth - 1.0)
}

/// Monthly-payment loan schedule aggregated into yearly rows.
///
/// The principal/interest split in each row uses a straight-line principal
/// share (`principal * 12 / n`); it is a display approximation, not the exact
/// annuity split. Totals come from the exact payment.
pub fn amortize(principal: f64, annual_rate_pct: f64, term_years: u32) -> Amortization {
    let months = term_years * 12;
    if months == 0 || principal <= 0.0 {
        return Amortization::default();
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let payment = level_payment(principal, monthly_rate, months);
    let total_paid = payment * months as f64;

    let yearly_payment = payment * 12.0;
    let yearly_principal = principal * 12.0 / months as f64;
    let mut balance = principal;
    let mut schedule = Vec::with_capacity(term_years as usize);
    for year in 1..=term_years {
        balance = (balance - yearly_principal).max(0.0);
        schedule.push(AmortizationYear {
            year,
            payment: yearly_payment,
            principal_paid: yearly_principal,
            interest_paid: yearly_payment - yearly_principal,
            balance,
        });
    }

    Amortization {
        payment,
        total_paid,
        total_interest: total_paid - principal,
        schedule,
    }
}

impl Amortization {
    /// Outstanding balance at the end of `year`; year 0 is the original loan.
    pub fn balance_after_year(&self, principal: f64, year: u32) -> f64 {
        if year == 0 {
            return principal.max(0.0);
        }
        self.schedule
            .get(year as usize - 1)
            .map(|row| row.balance)
            .unwrap_or(0.0)
    }

    pub fn term_years(&self) -> u32 {
        self.schedule.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn oracle_ten_lakh_at_ten_percent_for_ten_years() {
        let loan = amortize(1_000_000.0, 10.0, 10);
        assert_approx_tol(loan.payment, 13_215.07, 0.01);
        assert_approx_tol(loan.total_interest, loan.payment * 120.0 - 1_000_000.0, 1e-6);
        assert_eq!(loan.schedule.len(), 10);
        assert_eq!(loan.schedule[0].year, 1);
    }

    #[test]
    fn zero_rate_pays_principal_linearly() {
        let loan = amortize(120_000.0, 0.0, 1);
        assert_approx_tol(loan.payment, 10_000.0, 1e-9);
        assert_approx_tol(loan.total_interest, 0.0, 1e-9);
        assert!(loan.payment.is_finite());
    }

    #[test]
    fn zero_term_or_principal_is_empty() {
        assert!(amortize(1_000_000.0, 10.0, 0).schedule.is_empty());
        let none = amortize(0.0, 10.0, 10);
        assert!(none.schedule.is_empty());
        assert_eq!(none.payment, 0.0);
    }

    #[test]
    fn level_payment_matches_annual_annuity() {
        // 100k over 5 annual periods at 5%: 23,097.48
        assert_approx_tol(level_payment(100_000.0, 0.05, 5), 23_097.48, 0.01);
        assert_eq!(level_payment(100_000.0, 0.05, 0), 0.0);
    }

    #[test]
    fn balance_after_year_covers_before_during_and_after_term() {
        let loan = amortize(600_000.0, 9.0, 5);
        assert_approx_tol(loan.balance_after_year(600_000.0, 0), 600_000.0, 1e-9);
        assert_approx_tol(loan.balance_after_year(600_000.0, 1), 480_000.0, 1e-6);
        assert_approx_tol(loan.balance_after_year(600_000.0, 5), 0.0, 1e-6);
        assert_eq!(loan.balance_after_year(600_000.0, 9), 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_schedule_repays_principal_and_balance_never_rises(
            principal in 10_000u32..50_000_000,
            rate_bp in 0u32..3000,
            years in 1u32..31
        ) {
            let principal = principal as f64;
            let loan = amortize(principal, rate_bp as f64 / 100.0, years);
            let repaid: f64 = loan.schedule.iter().map(|row| row.principal_paid).sum();
            prop_assert!((repaid - principal).abs() <= principal * 1e-9);

            let mut previous = principal;
            for row in &loan.schedule {
                prop_assert!(row.balance <= previous + 1e-9);
                prop_assert!(row.balance >= 0.0);
                previous = row.balance;
            }
            prop_assert!(loan.payment.is_finite());
            prop_assert!(loan.total_interest >= -1e-6);
        }
    }
}
