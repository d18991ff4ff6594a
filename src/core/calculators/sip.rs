use serde::{Deserialize, Serialize};

use crate::core::accumulation::{GrowthYear, accumulate_annuity_due};
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipInput {
    pub monthly_investment: f64,
    pub years: u32,
    pub expected_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipResult {
    pub months: u32,
    pub monthly_rate: f64,
    pub invested_amount: f64,
    pub estimated_returns: f64,
    pub future_value: f64,
    pub wealth_multiple: f64,
    pub yearly: Vec<GrowthYear>,
}

pub struct Sip;

impl Calculator for Sip {
    const NAME: &'static str = "sip";
    const TITLE: &'static str = "SIP Calculator";

    type Input = SipInput;
    type Output = SipResult;

    fn validate(input: &SipInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.range(
            "monthlyInvestment",
            "Monthly investment",
            input.monthly_investment,
            100.0,
            10_000_000.0,
        );
        errors.int_range("years", "Investment period", input.years, 1, 50);
        errors.range(
            "expectedReturn",
            "Expected return",
            input.expected_return,
            1.0,
            30.0,
        );
        errors
    }

    fn compute(input: &SipInput) -> SipResult {
        let months = input.years * 12;
        let monthly_rate = input.expected_return / 100.0 / 12.0;
        let acc = accumulate_annuity_due(input.monthly_investment, monthly_rate, 12, input.years);
        let wealth_multiple = if acc.contributed > 0.0 {
            acc.final_value / acc.contributed
        } else {
            0.0
        };

        SipResult {
            months,
            monthly_rate,
            invested_amount: acc.contributed,
            estimated_returns: acc.gain(),
            future_value: acc.final_value,
            wealth_multiple,
            yearly: acc.series,
        }
    }

    fn insights(output: &SipResult, input: &SipInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<SipInput, SipResult>> {
    vec![
        Rule::success(
            |_: &SipInput, r: &SipResult| r.estimated_returns > r.invested_amount,
            |_: &SipInput, r: &SipResult| {
                format!(
                    "Your returns of {} exceed the {} you invest: money grows {:.1}x",
                    rupees(r.estimated_returns),
                    rupees(r.invested_amount),
                    r.wealth_multiple
                )
            },
        ),
        Rule::info(
            |i: &SipInput, _: &SipResult| i.years >= 15,
            |i: &SipInput, _: &SipResult| {
                format!(
                    "Over {} years compounding does most of the work; staying invested matters more than timing",
                    i.years
                )
            },
        ),
        Rule::warning(
            |i: &SipInput, _: &SipResult| i.expected_return > 15.0,
            |i: &SipInput, _: &SipResult| {
                format!(
                    "An expected return of {} is optimistic for equity funds; try 10-12% for a conservative plan",
                    pct(i.expected_return)
                )
            },
        ),
        Rule::info(
            |i: &SipInput, _: &SipResult| i.monthly_investment < 1_000.0,
            |_: &SipInput, _: &SipResult| {
                "Consider stepping up your SIP each year as your income grows".to_string()
            },
        ),
        Rule::warning(
            |i: &SipInput, _: &SipResult| i.years < 5,
            |_: &SipInput, _: &SipResult| {
                "Equity SIPs under 5 years are exposed to market swings; consider debt funds for short goals"
                    .to_string()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CalcError, Severity};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_input() -> SipInput {
        SipInput {
            monthly_investment: 5_000.0,
            years: 10,
            expected_return: 12.0,
        }
    }

    #[test]
    fn oracle_five_thousand_for_ten_years_at_twelve_percent() {
        let result = Sip::compute(&sample_input());
        assert_eq!(result.months, 120);
        assert_approx_tol(result.monthly_rate, 0.01, 1e-12);
        assert_approx_tol(result.future_value, 1_161_695.0, 1.0);
        assert_approx_tol(result.invested_amount, 600_000.0, 1e-9);
        assert_approx_tol(
            result.estimated_returns,
            result.future_value - 600_000.0,
            1e-9,
        );
        assert_eq!(result.yearly.len(), 10);
    }

    #[test]
    fn compute_is_idempotent() {
        let input = sample_input();
        assert_eq!(Sip::compute(&input), Sip::compute(&input));
    }

    #[test]
    fn run_blocks_out_of_range_fields() {
        let input = SipInput {
            monthly_investment: 50.0,
            years: 0,
            expected_return: 40.0,
        };
        let Err(CalcError::Validation(errors)) = Sip::run(&input) else {
            panic!("expected validation failure");
        };
        assert!(errors.contains("monthlyInvestment"));
        assert!(errors.contains("years"));
        assert!(errors.contains("expectedReturn"));
    }

    #[test]
    fn long_horizon_insights() {
        let input = SipInput {
            monthly_investment: 10_000.0,
            years: 20,
            expected_return: 12.0,
        };
        let report = Sip::run(&input).expect("valid input");
        assert_eq!(report.insights[0].severity, Severity::Success);
        assert!(report.insights.iter().any(|i| i.message.contains("20 years")));
    }

    #[test]
    fn short_optimistic_plan_warns_twice() {
        let input = SipInput {
            monthly_investment: 500.0,
            years: 3,
            expected_return: 18.0,
        };
        let insights = Sip::insights(&Sip::compute(&input), &input);
        let warnings = insights
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();
        assert_eq!(warnings, 2);
    }
}
