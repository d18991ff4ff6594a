use serde::Serialize;

/// Half of the smallest currency unit. A closing corpus above `-DEPLETION_TOLERANCE`
/// counts as intact so that a plan that ends exactly at zero is not reported as depleted.
pub const DEPLETION_TOLERANCE: f64 = 0.005;

/// Rounding drift relative to the corpus compounded without withdrawals.
/// Large balances drift by more than `DEPLETION_TOLERANCE` on their own.
const RELATIVE_DRIFT: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownYear {
    pub year: u32,
    pub opening: f64,
    pub interest: f64,
    pub withdrawal: f64,
    pub closing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownResult {
    pub series: Vec<DrawdownYear>,
    /// 1-based year in which the corpus ran out.
    pub depletion_year: Option<u32>,
    pub final_corpus: f64,
    pub total_withdrawn: f64,
}

impl DrawdownResult {
    pub fn sustainable(&self) -> bool {
        self.depletion_year.is_none()
    }
}

/// Corpus depletion under growth and an inflation-indexed withdrawal.
///
/// Each period: `interest = corpus * rate; corpus += interest - withdrawal`.
/// The withdrawal is indexed by `inflation` once a year, after the last
/// period of that year.
#[derive(Debug, Clone, Copy)]
pub struct Drawdown {
    pub corpus: f64,
    pub rate_per_period: f64,
    pub withdrawal_per_period: f64,
    pub inflation: f64,
    pub periods_per_year: u32,
}

impl Drawdown {
    pub fn yearly(corpus: f64, annual_rate: f64, yearly_withdrawal: f64, inflation: f64) -> Self {
        Self {
            corpus,
            rate_per_period: annual_rate,
            withdrawal_per_period: yearly_withdrawal,
            inflation,
            periods_per_year: 1,
        }
    }

    pub fn run(self, years: u32) -> DrawdownResult {
        let periods_per_year = self.periods_per_year.max(1);
        let mut corpus = self.corpus;
        let mut untouched = self.corpus.abs();
        let mut withdrawal = self.withdrawal_per_period;
        let mut total_withdrawn = 0.0;
        let mut series = Vec::with_capacity(years as usize);
        let mut depletion_year = None;

        'years: for year in 1..=years {
            let opening = corpus;
            let mut interest_year = 0.0;
            let mut withdrawal_year = 0.0;
            for _ in 0..periods_per_year {
                let interest = corpus * self.rate_per_period;
                corpus = corpus + interest - withdrawal;
                untouched *= 1.0 + self.rate_per_period;
                interest_year += interest;
                withdrawal_year += withdrawal;

                if corpus < -DEPLETION_TOLERANCE.max(untouched * RELATIVE_DRIFT) {
                    depletion_year = Some(year);
                    total_withdrawn += withdrawal_year;
                    series.push(DrawdownYear {
                        year,
                        opening,
                        interest: interest_year,
                        withdrawal: withdrawal_year,
                        closing: 0.0,
                    });
                    corpus = 0.0;
                    break 'years;
                }
            }

            corpus = corpus.max(0.0);
            total_withdrawn += withdrawal_year;
            series.push(DrawdownYear {
                year,
                opening,
                interest: interest_year,
                withdrawal: withdrawal_year,
                closing: corpus,
            });
            withdrawal *= 1.0 + self.inflation;
        }

        DrawdownResult {
            series,
            depletion_year,
            final_corpus: corpus,
            total_withdrawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amortization::level_payment;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn oracle_two_years_of_indexed_withdrawals() {
        let result = Drawdown::yearly(1_000.0, 0.10, 100.0, 0.05).run(2);
        assert_approx_tol(result.series[0].interest, 100.0, 1e-9);
        assert_approx_tol(result.series[0].closing, 1_000.0, 1e-9);
        assert_approx_tol(result.series[1].withdrawal, 105.0, 1e-9);
        assert_approx_tol(result.final_corpus, 995.0, 1e-9);
        assert!(result.sustainable());
    }

    #[test]
    fn detects_first_depleting_year_and_stops() {
        let result = Drawdown::yearly(250.0, 0.0, 100.0, 0.0).run(10);
        assert_eq!(result.depletion_year, Some(3));
        assert_eq!(result.series.len(), 3);
        assert_eq!(result.series[2].closing, 0.0);
        assert_eq!(result.final_corpus, 0.0);
    }

    #[test]
    fn level_payment_drawdown_ends_at_zero_without_false_depletion() {
        let monthly_rate = 0.08 / 12.0;
        let payout = level_payment(1_000_000.0, monthly_rate, 240);
        let result = Drawdown {
            corpus: 1_000_000.0,
            rate_per_period: monthly_rate,
            withdrawal_per_period: payout,
            inflation: 0.0,
            periods_per_year: 12,
        }
        .run(20);
        assert!(result.sustainable());
        assert_approx_tol(result.final_corpus, 0.0, 0.01);
        assert_eq!(result.series.len(), 20);
    }

    #[test]
    fn large_corpus_level_payment_is_not_depleted_by_rounding() {
        let monthly_rate = 0.20 / 12.0;
        let payout = level_payment(1e10, monthly_rate, 600);
        let result = Drawdown {
            corpus: 1e10,
            rate_per_period: monthly_rate,
            withdrawal_per_period: payout,
            inflation: 0.0,
            periods_per_year: 12,
        }
        .run(50);
        assert!(result.sustainable());
        assert_eq!(result.series.len(), 50);
    }

    #[test]
    fn overdrawn_level_payment_still_depletes() {
        let payout = level_payment(1e10, 0.20, 50);
        let result = Drawdown::yearly(1e10, 0.20, payout * 1.001, 0.0).run(50);
        assert!(result.depletion_year.is_some());
    }

    #[test]
    fn zero_years_is_empty() {
        let result = Drawdown::yearly(1_000.0, 0.05, 10.0, 0.02).run(0);
        assert!(result.series.is_empty());
        assert_eq!(result.final_corpus, 1_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_closing_corpus_is_finite_and_non_negative(
            corpus in 1_000u32..50_000_000,
            rate_bp in 0u32..2000,
            expense in 0u32..5_000_000,
            inflation_bp in 0u32..1500,
            years in 0u32..60
        ) {
            let result = Drawdown::yearly(
                corpus as f64,
                rate_bp as f64 / 10_000.0,
                expense as f64,
                inflation_bp as f64 / 10_000.0,
            ).run(years);

            for row in &result.series {
                prop_assert!(row.closing.is_finite());
                prop_assert!(row.closing >= 0.0);
            }
            match result.depletion_year {
                Some(year) => prop_assert!(result.series.len() as u32 == year),
                None => prop_assert!(result.series.len() as u32 == years),
            }
        }
    }
}
