use serde::Serialize;

/// The two compounding conventions in use. They are not numerically
/// equivalent and each calculator is pinned to one of them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compounding {
    /// Closed-form future value of an annuity due, contribution at the start
    /// of every period (SIP).
    AnnuityDue,
    /// Year-by-year `amount = amount * (1 + r) + contribution`.
    Reinvestment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthYear {
    pub year: u32,
    pub invested: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accumulation {
    pub compounding: Compounding,
    pub final_value: f64,
    pub contributed: f64,
    pub series: Vec<GrowthYear>,
}

/// `c * ((1+r)^n - 1) / r * (1+r)`, or `c * n` at zero rate.
pub fn annuity_due_value(contribution: f64, rate_per_period: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate_per_period.abs() <= 1e-12 {
        return contribution * n;
    }
    let growth = (1.0 + rate_per_period).powf(n);
    contribution * (growth - 1.0) / rate_per_period * (1.0 + rate_per_period)
}

/// Annuity-due accumulation reported once per year.
pub fn accumulate_annuity_due(
    contribution: f64,
    rate_per_period: f64,
    periods_per_year: u32,
    years: u32,
) -> Accumulation {
    let yearly_contribution = contribution * periods_per_year as f64;
    let series = (1..=years)
        .map(|year| GrowthYear {
            year,
            invested: yearly_contribution * year as f64,
            value: annuity_due_value(contribution, rate_per_period, year * periods_per_year),
        })
        .collect::<Vec<_>>();

    Accumulation {
        compounding: Compounding::AnnuityDue,
        final_value: series.last().map(|row| row.value).unwrap_or(0.0),
        contributed: yearly_contribution * years as f64,
        series,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reinvestment {
    pub initial: f64,
    pub yearly_contribution: f64,
    pub annual_rate: f64,
    /// Growth applied to the contribution after each year.
    pub step_up: f64,
}

impl Reinvestment {
    pub fn new(initial: f64, yearly_contribution: f64, annual_rate: f64) -> Self {
        Self {
            initial,
            yearly_contribution,
            annual_rate,
            step_up: 0.0,
        }
    }

    pub fn with_step_up(mut self, step_up: f64) -> Self {
        self.step_up = step_up;
        self
    }

    /// Yearly recurrence. `invested` counts the initial amount plus every
    /// contribution made so far.
    pub fn run(self, years: u32) -> Accumulation {
        let mut amount = self.initial;
        let mut contribution = self.yearly_contribution;
        let mut invested = self.initial;
        let mut series = Vec::with_capacity(years as usize);
        for year in 1..=years {
            amount = amount * (1.0 + self.annual_rate) + contribution;
            invested += contribution;
            series.push(GrowthYear {
                year,
                invested,
                value: amount,
            });
            contribution *= 1.0 + self.step_up;
        }

        Accumulation {
            compounding: Compounding::Reinvestment,
            final_value: amount,
            contributed: invested,
            series,
        }
    }
}

impl Accumulation {
    pub fn gain(&self) -> f64 {
        self.final_value - self.contributed
    }

    pub fn value_at(&self, year: u32) -> Option<f64> {
        if year == 0 {
            return None;
        }
        self.series.get(year as usize - 1).map(|row| row.value)
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
    fn oracle_sip_five_thousand_monthly_for_ten_years_at_twelve_percent() {
        let acc = accumulate_annuity_due(5_000.0, 0.01, 12, 10);
        assert_approx_tol(acc.final_value, 1_161_695.38, 0.5);
        assert_approx_tol(acc.contributed, 600_000.0, 1e-9);
        assert_eq!(acc.series.len(), 10);
        assert_approx_tol(acc.series[0].invested, 60_000.0, 1e-9);
    }

    #[test]
    fn annuity_due_zero_rate_is_linear() {
        assert_approx_tol(annuity_due_value(1_000.0, 0.0, 24), 24_000.0, 1e-9);
    }

    #[test]
    fn reinvestment_hand_calculation() {
        let acc = Reinvestment::new(1_000.0, 100.0, 0.10).run(2);
        // (1000*1.1 + 100) * 1.1 + 100
        assert_approx_tol(acc.series[0].value, 1_200.0, 1e-9);
        assert_approx_tol(acc.final_value, 1_420.0, 1e-9);
        assert_approx_tol(acc.contributed, 1_200.0, 1e-9);
    }

    #[test]
    fn reinvestment_step_up_grows_contribution_after_each_year() {
        let acc = Reinvestment::new(0.0, 100.0, 0.0).with_step_up(0.10).run(3);
        assert_approx_tol(acc.contributed, 100.0 + 110.0 + 121.0, 1e-9);
    }

    #[test]
    fn conventions_differ_for_same_contributions() {
        let due = accumulate_annuity_due(12_000.0, 0.10, 1, 10);
        let reinvested = Reinvestment::new(0.0, 12_000.0, 0.10).run(10);
        assert!(due.final_value > reinvested.final_value);
        assert_approx_tol(due.final_value, reinvested.final_value * 1.10, 1e-6);
    }

    #[test]
    fn zero_periods_yield_empty_series() {
        assert!(accumulate_annuity_due(5_000.0, 0.01, 12, 0).series.is_empty());
        let acc = Reinvestment::new(500.0, 100.0, 0.08).run(0);
        assert!(acc.series.is_empty());
        assert_eq!(acc.final_value, 500.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_invested_is_linear_and_value_covers_it(
            monthly in 100u32..200_000,
            rate_bp in 0u32..3000,
            years in 1u32..51
        ) {
            let monthly = monthly as f64;
            let acc = accumulate_annuity_due(monthly, rate_bp as f64 / 10_000.0 / 12.0, 12, years);
            prop_assert!((acc.series[0].invested - monthly * 12.0).abs() < 1e-6);
            for row in &acc.series {
                prop_assert!((row.invested - monthly * 12.0 * row.year as f64).abs() < 1e-6);
                prop_assert!(row.value + 1e-6 >= row.invested);
            }

            let reinvested = Reinvestment::new(0.0, monthly * 12.0, rate_bp as f64 / 10_000.0).run(years);
            for row in &reinvested.series {
                prop_assert!(row.value + 1e-6 >= row.invested);
            }
        }
    }
}
