use serde::{Deserialize, Serialize};

use crate::core::accumulation::{accumulate_annuity_due, annuity_due_value};
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::solver::{first_crossing, solve_rate};
use crate::core::types::{Calculator, FieldErrors, Insight, finite_or};

/// No surrender value before this policy year.
const SURRENDER_LOCK_IN_YEARS: u32 = 3;
const MIN_SURRENDER_FACTOR: f64 = 0.30;
const MAX_SURRENDER_FACTOR: f64 = 0.90;
/// Share of accrued bonus paid out on surrender.
const BONUS_SURRENDER_FACTOR: f64 = 0.50;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndowmentInput {
    pub sum_assured: f64,
    pub annual_premium: f64,
    pub term_years: u32,
    /// Simple reversionary bonus, percent of sum assured per year.
    pub bonus_rate: f64,
    pub alternative_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyYear {
    pub year: u32,
    pub cumulative_premium: f64,
    pub accrued_bonus: f64,
    pub surrender_value: f64,
    pub alternative_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndowmentResult {
    pub maturity_value: f64,
    pub total_premium: f64,
    pub total_bonus: f64,
    /// `(maturity / total premium)^(1/term) - 1`, in percent.
    pub effective_return: f64,
    /// Internal rate of return of the premium stream, in percent.
    pub irr: Option<f64>,
    pub surrender_break_even_year: Option<u32>,
    pub alternative_corpus: f64,
    pub yearly: Vec<PolicyYear>,
}

pub struct Endowment;

impl Calculator for Endowment {
    const NAME: &'static str = "endowment";
    const TITLE: &'static str = "Endowment Policy Calculator";

    type Input = EndowmentInput;
    type Output = EndowmentResult;

    fn validate(input: &EndowmentInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive("sumAssured", "Sum assured", input.sum_assured, 1e10);
        errors.positive("annualPremium", "Annual premium", input.annual_premium, 1e9);
        errors.int_range("termYears", "Policy term", input.term_years, 5, 40);
        errors.range("bonusRate", "Bonus rate", input.bonus_rate, 0.0, 10.0);
        errors.range(
            "alternativeReturn",
            "Alternative return",
            input.alternative_return,
            0.0,
            20.0,
        );
        errors
    }

    fn compute(input: &EndowmentInput) -> EndowmentResult {
        let term = input.term_years;
        let bonus = input.bonus_rate / 100.0;
        let total_bonus = input.sum_assured * bonus * term as f64;
        let maturity_value = input.sum_assured + total_bonus;
        let total_premium = input.annual_premium * term as f64;

        let effective_return = if total_premium > 0.0 && term > 0 {
            ((maturity_value / total_premium).powf(1.0 / term as f64) - 1.0) * 100.0
        } else {
            0.0
        };

        let alternative = accumulate_annuity_due(
            input.annual_premium,
            input.alternative_return / 100.0,
            1,
            term,
        );

        let yearly = (1..=term)
            .map(|year| {
                let cumulative_premium = input.annual_premium * year as f64;
                let accrued_bonus = input.sum_assured * bonus * year as f64;
                PolicyYear {
                    year,
                    cumulative_premium,
                    accrued_bonus,
                    surrender_value: surrender_value(
                        year,
                        term,
                        cumulative_premium,
                        accrued_bonus,
                        maturity_value,
                    ),
                    alternative_value: alternative.value_at(year).unwrap_or(0.0),
                }
            })
            .collect::<Vec<_>>();

        let surrender_break_even_year = first_crossing(
            yearly
                .iter()
                .map(|row| row.surrender_value - row.cumulative_premium),
            |surplus| surplus >= 0.0,
        );

        let irr = solve_rate(
            |rate| annuity_due_value(input.annual_premium, rate, term),
            maturity_value,
            -0.99,
            1.0,
            1e-10,
            200,
        )
        .map(|rate| finite_or(rate * 100.0, 0.0));

        EndowmentResult {
            maturity_value,
            total_premium,
            total_bonus,
            effective_return,
            irr,
            surrender_break_even_year,
            alternative_corpus: alternative.final_value,
            yearly,
        }
    }

    fn insights(output: &EndowmentResult, input: &EndowmentInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn surrender_value(
    year: u32,
    term: u32,
    cumulative_premium: f64,
    accrued_bonus: f64,
    maturity_value: f64,
) -> f64 {
    if year >= term {
        return maturity_value;
    }
    if year < SURRENDER_LOCK_IN_YEARS {
        return 0.0;
    }
    let ramp_years = term.saturating_sub(SURRENDER_LOCK_IN_YEARS + 1).max(1) as f64;
    let progress = ((year - SURRENDER_LOCK_IN_YEARS) as f64 / ramp_years).min(1.0);
    let factor = MIN_SURRENDER_FACTOR + (MAX_SURRENDER_FACTOR - MIN_SURRENDER_FACTOR) * progress;
    cumulative_premium * factor + accrued_bonus * BONUS_SURRENDER_FACTOR
}

fn rules() -> Vec<Rule<EndowmentInput, EndowmentResult>> {
    vec![
        Rule::warning(
            |_: &EndowmentInput, r: &EndowmentResult| r.effective_return < 6.0,
            |_: &EndowmentInput, r: &EndowmentResult| {
                format!(
                    "An effective return of {} trails a fixed deposit",
                    pct(r.effective_return)
                )
            },
        ),
        Rule::success(
            |_: &EndowmentInput, r: &EndowmentResult| r.effective_return > 8.0,
            |_: &EndowmentInput, r: &EndowmentResult| {
                format!(
                    "An effective return of {} is competitive for a guaranteed product",
                    pct(r.effective_return)
                )
            },
        ),
        Rule::info(
            |_: &EndowmentInput, r: &EndowmentResult| r.alternative_corpus > r.maturity_value,
            |i: &EndowmentInput, r: &EndowmentResult| {
                format!(
                    "Investing the premiums at {} would grow to {} against a maturity value of {}; a term plan plus investing may serve you better",
                    pct(i.alternative_return),
                    rupees(r.alternative_corpus),
                    rupees(r.maturity_value)
                )
            },
        ),
        Rule::warning(
            |_: &EndowmentInput, r: &EndowmentResult| r.surrender_break_even_year.is_none(),
            |_: &EndowmentInput, _: &EndowmentResult| {
                "Surrendering before maturity always returns less than the premiums paid".to_string()
            },
        ),
        Rule::info(
            |_: &EndowmentInput, r: &EndowmentResult| r.surrender_break_even_year.is_some(),
            |_: &EndowmentInput, r: &EndowmentResult| {
                format!(
                    "The surrender value covers your premiums from policy year {}",
                    r.surrender_break_even_year.unwrap_or_default()
                )
            },
        ),
    ]
}
