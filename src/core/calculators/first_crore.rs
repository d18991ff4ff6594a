use serde::{Deserialize, Serialize};

use crate::core::accumulation::{GrowthYear, Reinvestment};
use crate::core::insight::{Rule, evaluate, rupees};
use crate::core::solver::first_crossing;
use crate::core::types::{Calculator, FieldErrors, Insight};

pub const ONE_CRORE: f64 = 10_000_000.0;
/// Years shown in the growth chart, whatever the target timeframe.
pub const CHART_YEARS: u32 = 10;

fn default_target_amount() -> f64 {
    ONE_CRORE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstCroreInput {
    pub current_age: u32,
    pub current_savings: f64,
    pub monthly_investment: f64,
    pub expected_return: f64,
    pub annual_step_up: f64,
    #[serde(default = "default_target_amount")]
    pub target_amount: f64,
    pub target_timeframe: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstCroreResult {
    pub target_amount: f64,
    pub years_to_target: Option<u32>,
    pub target_age: Option<u32>,
    pub value_at_timeframe: f64,
    pub invested_at_timeframe: f64,
    pub chart: Vec<GrowthYear>,
}

pub struct FirstCrore;

impl Calculator for FirstCrore {
    const NAME: &'static str = "first-crore";
    const TITLE: &'static str = "First Crore Calculator";

    type Input = FirstCroreInput;
    type Output = FirstCroreResult;

    fn validate(input: &FirstCroreInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.int_range("currentAge", "Current age", input.current_age, 18, 80);
        errors.range(
            "currentSavings",
            "Current savings",
            input.current_savings,
            0.0,
            1e10,
        );
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
            "annualStepUp",
            "Annual step-up",
            input.annual_step_up,
            0.0,
            50.0,
        );
        errors.positive("targetAmount", "Target amount", input.target_amount, 1e11);
        errors.int_range(
            "targetTimeframe",
            "Target timeframe",
            input.target_timeframe,
            1,
            50,
        );
        errors
    }

    fn compute(input: &FirstCroreInput) -> FirstCroreResult {
        let growth = Reinvestment::new(
            input.current_savings,
            input.monthly_investment * 12.0,
            input.expected_return / 100.0,
        )
        .with_step_up(input.annual_step_up / 100.0)
        .run(input.target_timeframe.max(CHART_YEARS));

        let within_timeframe = &growth.series[..input.target_timeframe as usize];
        let years_to_target = if input.current_savings >= input.target_amount {
            Some(0)
        } else {
            first_crossing(within_timeframe.iter().map(|row| row.value), |value| {
                value >= input.target_amount
            })
        };

        let at_timeframe = within_timeframe.last();

        FirstCroreResult {
            target_amount: input.target_amount,
            years_to_target,
            target_age: years_to_target.map(|years| input.current_age + years),
            value_at_timeframe: at_timeframe.map(|row| row.value).unwrap_or(input.current_savings),
            invested_at_timeframe: at_timeframe
                .map(|row| row.invested)
                .unwrap_or(input.current_savings),
            chart: growth.series[..CHART_YEARS as usize].to_vec(),
        }
    }

    fn insights(output: &FirstCroreResult, input: &FirstCroreInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<FirstCroreInput, FirstCroreResult>> {
    vec![
        Rule::success(
            |_: &FirstCroreInput, r: &FirstCroreResult| r.years_to_target.is_some(),
            |_: &FirstCroreInput, r: &FirstCroreResult| {
                format!(
                    "You reach {} in {} years, at age {}",
                    rupees(r.target_amount),
                    r.years_to_target.unwrap_or_default(),
                    r.target_age.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |_: &FirstCroreInput, r: &FirstCroreResult| r.years_to_target.is_none(),
            |i: &FirstCroreInput, r: &FirstCroreResult| {
                format!(
                    "At this pace you will have {} after {} years, short of {}",
                    rupees(r.value_at_timeframe),
                    i.target_timeframe,
                    rupees(r.target_amount)
                )
            },
        ),
        Rule::info(
            |i: &FirstCroreInput, _: &FirstCroreResult| i.annual_step_up == 0.0,
            |_: &FirstCroreInput, _: &FirstCroreResult| {
                "Raising your investment each year with your salary shortens the journey considerably".to_string()
            },
        ),
        Rule::success(
            |_: &FirstCroreInput, r: &FirstCroreResult| r.years_to_target.is_some_and(|y| y <= 5),
            |_: &FirstCroreInput, _: &FirstCroreResult| {
                "Reaching the target within five years puts you well ahead of most savers".to_string()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Severity;

    fn sample_input() -> FirstCroreInput {
        FirstCroreInput {
            current_age: 25,
            current_savings: 0.0,
            monthly_investment: 100_000.0,
            expected_return: 0.0,
            annual_step_up: 0.0,
            target_amount: ONE_CRORE,
            target_timeframe: 20,
        }
    }

    #[test]
    fn zero_return_reaches_crore_in_ninth_year() {
        // 1.2M a year: 9.6M after 8 years, 10.8M after 9
        let result = FirstCrore::compute(&sample_input());
        assert_eq!(result.years_to_target, Some(9));
        assert_eq!(result.target_age, Some(34));
        assert!((result.value_at_timeframe - 24_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn chart_window_is_fixed_regardless_of_timeframe() {
        let long = FirstCrore::compute(&sample_input());
        let short = FirstCrore::compute(&FirstCroreInput {
            target_timeframe: 3,
            ..sample_input()
        });
        assert_eq!(long.chart.len(), CHART_YEARS as usize);
        assert_eq!(short.chart.len(), CHART_YEARS as usize);
        assert_eq!(short.years_to_target, None);
        assert!((short.value_at_timeframe - 3_600_000.0).abs() < 1e-6);
    }

    #[test]
    fn search_stops_at_timeframe() {
        let result = FirstCrore::compute(&FirstCroreInput {
            target_timeframe: 8,
            ..sample_input()
        });
        assert_eq!(result.years_to_target, None);
        assert!(result.chart[8].value >= ONE_CRORE);
    }

    #[test]
    fn target_defaults_to_one_crore() {
        let input: FirstCroreInput = serde_json::from_str(
            r#"{"currentAge":30,"currentSavings":0,"monthlyInvestment":50000,
                "expectedReturn":12,"annualStepUp":10,"targetTimeframe":15}"#,
        )
        .expect("parse");
        assert_eq!(input.target_amount, ONE_CRORE);
        let report = FirstCrore::run(&input).expect("valid input");
        // 9.97M after 8 years, 12.45M after 9
        let year = report.results.years_to_target.expect("reached");
        assert_eq!(year, 9);
        let chart = &report.results.chart;
        assert!(chart[year as usize - 1].value >= ONE_CRORE);
        assert!(chart[year as usize - 2].value < ONE_CRORE);
    }

    #[test]
    fn existing_savings_already_at_target() {
        let result = FirstCrore::compute(&FirstCroreInput {
            current_savings: 12_000_000.0,
            ..sample_input()
        });
        assert_eq!(result.years_to_target, Some(0));
        assert_eq!(result.target_age, Some(25));
    }

    #[test]
    fn flat_contribution_gets_step_up_tip() {
        let report = FirstCrore::run(&sample_input()).expect("valid input");
        let severities = report
            .insights
            .iter()
            .map(|i| i.severity)
            .collect::<Vec<_>>();
        assert_eq!(severities, vec![Severity::Success, Severity::Info]);
    }
}
