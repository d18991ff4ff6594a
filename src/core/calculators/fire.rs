use serde::{Deserialize, Serialize};

use crate::core::accumulation::Reinvestment;
use crate::core::decumulation::Drawdown;
use crate::core::insight::{Rule, evaluate, rupees};
use crate::core::solver::{first_crossing, required_yearly_contribution};
use crate::core::types::{Calculator, FieldErrors, Insight};

/// Target corpus as a multiple of the first retirement year's expense (4% rule).
pub const FOUR_PERCENT_RULE_MULTIPLE: f64 = 25.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub monthly_expense: f64,
    pub monthly_investment: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub post_retirement_return: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Accumulation,
    Retirement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireYear {
    pub age: u32,
    pub phase: Phase,
    pub corpus: f64,
    pub target: Option<f64>,
    pub expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireResult {
    pub years_to_retirement: u32,
    pub final_yearly_expense: f64,
    pub target_corpus: f64,
    pub projected_corpus: f64,
    pub shortfall: f64,
    pub on_track: bool,
    pub fire_age: Option<u32>,
    pub required_monthly_investment: f64,
    pub depletion_age: Option<u32>,
    pub total_invested: f64,
    pub yearly: Vec<FireYear>,
}

pub struct Fire;

impl Calculator for Fire {
    const NAME: &'static str = "fire";
    const TITLE: &'static str = "FIRE Calculator";

    type Input = FireInput;
    type Output = FireResult;

    fn validate(input: &FireInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.int_range("currentAge", "Current age", input.current_age, 18, 70);
        errors.int_range(
            "retirementAge",
            "Retirement age",
            input.retirement_age,
            input.current_age.saturating_add(1),
            80,
        );
        errors.int_range(
            "lifeExpectancy",
            "Life expectancy",
            input.life_expectancy,
            input.retirement_age.saturating_add(1),
            110,
        );
        errors.range(
            "currentSavings",
            "Current savings",
            input.current_savings,
            0.0,
            1e10,
        );
        errors.positive("monthlyExpense", "Monthly expense", input.monthly_expense, 1e8);
        errors.range(
            "monthlyInvestment",
            "Monthly investment",
            input.monthly_investment,
            0.0,
            1e8,
        );
        errors.range(
            "expectedReturn",
            "Expected return",
            input.expected_return,
            0.0,
            30.0,
        );
        errors.range(
            "inflationRate",
            "Inflation rate",
            input.inflation_rate,
            0.0,
            15.0,
        );
        errors.range(
            "postRetirementReturn",
            "Post-retirement return",
            input.post_retirement_return,
            0.0,
            20.0,
        );
        errors
    }

    fn compute(input: &FireInput) -> FireResult {
        let years = input.retirement_age.saturating_sub(input.current_age);
        let rate = input.expected_return / 100.0;
        let inflation = input.inflation_rate / 100.0;

        let final_yearly_expense =
            input.monthly_expense * 12.0 * (1.0 + inflation).powf(years as f64);
        let target_corpus = final_yearly_expense * FOUR_PERCENT_RULE_MULTIPLE;

        let accumulation =
            Reinvestment::new(input.current_savings, input.monthly_investment * 12.0, rate)
                .run(years);
        let projected_corpus = accumulation.final_value;
        let fire_age = first_crossing(
            accumulation.series.iter().map(|row| row.value),
            |value| value >= target_corpus,
        )
        .map(|year| input.current_age + year);

        let required_monthly_investment =
            required_yearly_contribution(input.current_savings, rate, years, target_corpus) / 12.0;

        let retired_years = input.life_expectancy.saturating_sub(input.retirement_age);
        let drawdown = Drawdown::yearly(
            projected_corpus,
            input.post_retirement_return / 100.0,
            final_yearly_expense,
            inflation,
        )
        .run(retired_years);

        let mut yearly = accumulation
            .series
            .iter()
            .map(|row| FireYear {
                age: input.current_age + row.year,
                phase: Phase::Accumulation,
                corpus: row.value,
                target: Some(target_corpus),
                expense: input.monthly_expense * 12.0 * (1.0 + inflation).powf(row.year as f64),
            })
            .collect::<Vec<_>>();
        yearly.extend(drawdown.series.iter().map(|row| FireYear {
            age: input.retirement_age + row.year,
            phase: Phase::Retirement,
            corpus: row.closing,
            target: None,
            expense: row.withdrawal,
        }));

        FireResult {
            years_to_retirement: years,
            final_yearly_expense,
            target_corpus,
            projected_corpus,
            shortfall: (target_corpus - projected_corpus).max(0.0),
            on_track: projected_corpus >= target_corpus,
            fire_age,
            required_monthly_investment,
            depletion_age: drawdown
                .depletion_year
                .map(|year| input.retirement_age + year),
            total_invested: accumulation.contributed,
            yearly,
        }
    }

    fn insights(output: &FireResult, input: &FireInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<FireInput, FireResult>> {
    vec![
        Rule::success(
            |_: &FireInput, r: &FireResult| r.on_track,
            |i: &FireInput, r: &FireResult| {
                format!(
                    "On track: {} projected at age {} against a target of {}",
                    rupees(r.projected_corpus),
                    i.retirement_age,
                    rupees(r.target_corpus)
                )
            },
        ),
        Rule::warning(
            |_: &FireInput, r: &FireResult| r.shortfall > 0.0,
            |_: &FireInput, r: &FireResult| {
                format!(
                    "Shortfall of {}; investing {} a month would close the gap",
                    rupees(r.shortfall),
                    rupees(r.required_monthly_investment)
                )
            },
        ),
        Rule::success(
            |i: &FireInput, r: &FireResult| r.fire_age.is_some_and(|age| age < i.retirement_age),
            |i: &FireInput, r: &FireResult| {
                let age = r.fire_age.unwrap_or(i.retirement_age);
                format!(
                    "You could reach financial independence at age {age}, {} years early",
                    i.retirement_age - age
                )
            },
        ),
        Rule::warning(
            |_: &FireInput, r: &FireResult| r.depletion_age.is_some(),
            |_: &FireInput, r: &FireResult| {
                format!(
                    "At the planned spending the corpus runs out at age {}",
                    r.depletion_age.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |i: &FireInput, _: &FireResult| i.expected_return <= i.inflation_rate,
            |_: &FireInput, _: &FireResult| {
                "Your expected return does not beat inflation; savings lose value in real terms"
                    .to_string()
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

    fn sample_input() -> FireInput {
        FireInput {
            current_age: 30,
            retirement_age: 45,
            life_expectancy: 85,
            current_savings: 2_000_000.0,
            monthly_expense: 50_000.0,
            monthly_investment: 100_000.0,
            expected_return: 12.0,
            inflation_rate: 6.0,
            post_retirement_return: 8.0,
        }
    }

    #[test]
    fn target_uses_four_percent_rule_on_inflated_expense() {
        let result = Fire::compute(&sample_input());
        let expected_expense = 600_000.0 * 1.06_f64.powi(15);
        assert_approx_tol(result.final_yearly_expense, expected_expense, 1e-6);
        assert_approx_tol(result.target_corpus, expected_expense * 25.0, 1e-6);
        assert_eq!(result.years_to_retirement, 15);
    }

    #[test]
    fn oracle_one_year_recurrence() {
        let input = FireInput {
            current_age: 40,
            retirement_age: 41,
            life_expectancy: 42,
            current_savings: 1_000.0,
            monthly_expense: 10.0,
            monthly_investment: 100.0,
            expected_return: 10.0,
            inflation_rate: 0.0,
            post_retirement_return: 0.0,
        };
        let result = Fire::compute(&input);
        assert_approx_tol(result.projected_corpus, 1_000.0 * 1.1 + 1_200.0, 1e-9);
        assert_approx_tol(result.target_corpus, 3_000.0, 1e-9);
        assert_eq!(result.yearly.len(), 2);
        assert_eq!(result.yearly[1].phase, Phase::Retirement);
        assert_approx_tol(result.yearly[1].corpus, 2_300.0 - 120.0, 1e-9);
    }

    #[test]
    fn shortfall_reports_required_investment_that_closes_gap() {
        let input = FireInput {
            monthly_investment: 10_000.0,
            ..sample_input()
        };
        let report = Fire::run(&input).expect("valid input");
        let result = &report.results;
        assert!(!result.on_track);
        assert!(result.fire_age.is_none());
        assert!(result.required_monthly_investment > input.monthly_investment);

        let fixed = Fire::compute(&FireInput {
            monthly_investment: result.required_monthly_investment,
            ..input.clone()
        });
        assert_approx_tol(fixed.projected_corpus, result.target_corpus, 1e-3);
        assert_eq!(report.insights[0].severity, Severity::Warning);
    }

    #[test]
    fn early_fire_age_is_first_crossing() {
        let result = Fire::compute(&sample_input());
        let age = result.fire_age.expect("target crossed");
        let index = (age - 30) as usize;
        assert!(result.yearly[index - 1].corpus >= result.target_corpus);
        if index >= 2 {
            assert!(result.yearly[index - 2].corpus < result.target_corpus);
        }
    }

    #[test]
    fn retirement_ages_are_validated_in_order() {
        let errors = Fire::validate(&FireInput {
            retirement_age: 30,
            life_expectancy: 30,
            ..sample_input()
        });
        assert!(errors.contains("retirementAge"));
        assert!(errors.contains("lifeExpectancy"));
    }
}
