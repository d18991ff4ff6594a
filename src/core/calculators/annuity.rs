use serde::{Deserialize, Serialize};

use crate::core::amortization::level_payment;
use crate::core::decumulation::{Drawdown, DrawdownYear};
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutFrequency {
    Monthly,
    Quarterly,
    #[serde(alias = "semi-annual", alias = "semiAnnual")]
    Semiannual,
    #[serde(alias = "yearly")]
    Annual,
}

impl PayoutFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PayoutFrequency::Monthly => 12,
            PayoutFrequency::Quarterly => 4,
            PayoutFrequency::Semiannual => 2,
            PayoutFrequency::Annual => 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityInput {
    pub corpus: f64,
    pub annual_rate: f64,
    pub payout_frequency: PayoutFrequency,
    pub years: u32,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityResult {
    pub periodic_payout: f64,
    pub annual_payout: f64,
    pub total_payout: f64,
    pub total_interest: f64,
    pub depletion_year: Option<u32>,
    pub final_corpus: f64,
    /// The first year's annual payout, unindexed, in today's money during the last year.
    pub real_payout_final_year: f64,
    pub purchasing_power_loss: f64,
    pub yearly: Vec<DrawdownYear>,
}

pub struct Annuity;

impl Calculator for Annuity {
    const NAME: &'static str = "annuity";
    const TITLE: &'static str = "Annuity Calculator";

    type Input = AnnuityInput;
    type Output = AnnuityResult;

    fn validate(input: &AnnuityInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive("corpus", "Annuity corpus", input.corpus, 1e10);
        errors.range("annualRate", "Annuity rate", input.annual_rate, 0.0, 20.0);
        errors.int_range("years", "Payout period", input.years, 1, 50);
        errors.range(
            "inflationRate",
            "Inflation rate",
            input.inflation_rate,
            0.0,
            15.0,
        );
        errors
    }

    fn compute(input: &AnnuityInput) -> AnnuityResult {
        let periods_per_year = input.payout_frequency.periods_per_year();
        let rate_per_period = input.annual_rate / 100.0 / periods_per_year as f64;
        let inflation = input.inflation_rate / 100.0;
        let periodic_payout =
            level_payment(input.corpus, rate_per_period, input.years * periods_per_year);

        let drawdown = Drawdown {
            corpus: input.corpus,
            rate_per_period,
            withdrawal_per_period: periodic_payout,
            inflation,
            periods_per_year,
        }
        .run(input.years);

        let annual_payout = periodic_payout * periods_per_year as f64;
        let deflator = (1.0 + inflation).powf(input.years.saturating_sub(1) as f64);
        let real_payout_final_year = annual_payout / deflator;

        AnnuityResult {
            periodic_payout,
            annual_payout,
            total_payout: drawdown.total_withdrawn,
            total_interest: drawdown.series.iter().map(|row| row.interest).sum(),
            depletion_year: drawdown.depletion_year,
            final_corpus: drawdown.final_corpus,
            real_payout_final_year,
            purchasing_power_loss: (1.0 - 1.0 / deflator) * 100.0,
            yearly: drawdown.series,
        }
    }

    fn insights(output: &AnnuityResult, input: &AnnuityInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<AnnuityInput, AnnuityResult>> {
    vec![
        Rule::success(
            |_: &AnnuityInput, r: &AnnuityResult| r.depletion_year.is_none(),
            |i: &AnnuityInput, r: &AnnuityResult| {
                format!(
                    "The corpus sustains payouts of {} a year for all {} years",
                    rupees(r.annual_payout),
                    i.years
                )
            },
        ),
        Rule::warning(
            |_: &AnnuityInput, r: &AnnuityResult| r.depletion_year.is_some(),
            |_: &AnnuityInput, r: &AnnuityResult| {
                format!(
                    "Raising the payout with inflation exhausts the corpus in year {}",
                    r.depletion_year.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |_: &AnnuityInput, r: &AnnuityResult| r.purchasing_power_loss > 30.0,
            |i: &AnnuityInput, r: &AnnuityResult| {
                format!(
                    "A fixed payout loses {} of its purchasing power by year {}",
                    pct(r.purchasing_power_loss),
                    i.years
                )
            },
        ),
        Rule::info(
            |i: &AnnuityInput, _: &AnnuityResult| i.payout_frequency == PayoutFrequency::Monthly,
            |_: &AnnuityInput, r: &AnnuityResult| {
                format!(
                    "Monthly payouts of {} match regular expenses; less frequent payouts keep more invested for longer",
                    rupees(r.periodic_payout)
                )
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Severity;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_input() -> AnnuityInput {
        AnnuityInput {
            corpus: 1_000_000.0,
            annual_rate: 8.0,
            payout_frequency: PayoutFrequency::Monthly,
            years: 20,
            inflation_rate: 0.0,
        }
    }

    #[test]
    fn level_payout_exhausts_corpus_exactly() {
        let report = Annuity::run(&sample_input()).expect("valid input");
        let result = &report.results;
        assert_approx_tol(result.periodic_payout, 8_364.40, 0.01);
        assert_eq!(result.depletion_year, None);
        assert_approx_tol(result.final_corpus, 0.0, 0.01);
        assert_eq!(result.yearly.len(), 20);
        assert_approx_tol(result.total_payout, result.periodic_payout * 240.0, 1e-6);
        assert_eq!(report.insights[0].severity, Severity::Success);
    }

    #[test]
    fn inflation_indexed_payout_depletes_before_term() {
        let report = Annuity::run(&AnnuityInput {
            inflation_rate: 5.0,
            ..sample_input()
        })
        .expect("valid input");
        let year = report.results.depletion_year.expect("depletes");
        assert!(year < 20);
        assert_eq!(report.results.yearly.len() as u32, year);
        assert_eq!(report.insights[0].severity, Severity::Warning);
        assert!(report.results.purchasing_power_loss > 30.0);
    }

    #[test]
    fn zero_rate_annual_payout_is_linear() {
        let result = Annuity::compute(&AnnuityInput {
            annual_rate: 0.0,
            payout_frequency: PayoutFrequency::Annual,
            years: 10,
            ..sample_input()
        });
        assert_approx_tol(result.periodic_payout, 100_000.0, 1e-9);
        assert_approx_tol(result.total_interest, 0.0, 1e-9);
        assert_eq!(result.depletion_year, None);
    }

    #[test]
    fn large_corpus_level_payout_is_sustained_at_every_frequency() {
        for payout_frequency in [
            PayoutFrequency::Monthly,
            PayoutFrequency::Quarterly,
            PayoutFrequency::Semiannual,
            PayoutFrequency::Annual,
        ] {
            for (corpus, annual_rate) in [(1e9, 20.0), (1e10, 12.5), (1e10, 15.0), (1e10, 20.0)] {
                for years in [49, 50] {
                    let report = Annuity::run(&AnnuityInput {
                        corpus,
                        annual_rate,
                        payout_frequency,
                        years,
                        inflation_rate: 0.0,
                    })
                    .expect("valid input");
                    assert_eq!(
                        report.results.depletion_year, None,
                        "{corpus} at {annual_rate}% {payout_frequency:?} over {years} years"
                    );
                    assert_eq!(report.results.yearly.len() as u32, years);
                    assert_eq!(report.insights[0].severity, Severity::Success);
                }
            }
        }
    }

    #[test]
    fn frequency_parses_from_wire_names() {
        let freq: PayoutFrequency = serde_json::from_str("\"semiannual\"").expect("parse");
        assert_eq!(freq.periods_per_year(), 2);
        let freq: PayoutFrequency = serde_json::from_str("\"quarterly\"").expect("parse");
        assert_eq!(freq.periods_per_year(), 4);
    }
}
