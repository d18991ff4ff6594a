use serde::{Deserialize, Serialize};

use crate::core::amortization::level_payment;
use crate::core::decumulation::Drawdown;
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdSustainabilityInput {
    pub initial_corpus: f64,
    pub yearly_expense: f64,
    pub return_rate: f64,
    pub inflation_rate: f64,
    pub current_age: u32,
    pub life_expectancy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusYear {
    pub year: u32,
    pub age: u32,
    pub opening_corpus: f64,
    pub interest: f64,
    pub expense: f64,
    pub closing_corpus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FdSustainabilityResult {
    pub sustainable: bool,
    pub depletion_age: Option<u32>,
    pub final_corpus: f64,
    pub total_interest: f64,
    pub total_expenses: f64,
    /// `(1 + r) / (1 + i) - 1`, in percent.
    pub real_return: f64,
    /// First-year expense as a percentage of the corpus.
    pub withdrawal_rate: f64,
    /// Level yearly withdrawal in today's money that exhausts the corpus exactly at life expectancy.
    pub sustainable_yearly_withdrawal: f64,
    pub yearly: Vec<CorpusYear>,
}

pub struct FdSustainability;

impl Calculator for FdSustainability {
    const NAME: &'static str = "fd-sustainability";
    const TITLE: &'static str = "FD Sustainability Calculator";

    type Input = FdSustainabilityInput;
    type Output = FdSustainabilityResult;

    fn validate(input: &FdSustainabilityInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive("initialCorpus", "Initial corpus", input.initial_corpus, 1e10);
        errors.positive("yearlyExpense", "Yearly expense", input.yearly_expense, 1e9);
        errors.range("returnRate", "FD return rate", input.return_rate, 0.0, 20.0);
        errors.range(
            "inflationRate",
            "Inflation rate",
            input.inflation_rate,
            0.0,
            15.0,
        );
        errors.int_range("currentAge", "Current age", input.current_age, 18, 100);
        errors.int_range(
            "lifeExpectancy",
            "Life expectancy",
            input.life_expectancy,
            input.current_age.saturating_add(1),
            110,
        );
        errors
    }

    fn compute(input: &FdSustainabilityInput) -> FdSustainabilityResult {
        let rate = input.return_rate / 100.0;
        let inflation = input.inflation_rate / 100.0;
        let years = input.life_expectancy.saturating_sub(input.current_age);

        let drawdown = Drawdown::yearly(input.initial_corpus, rate, input.yearly_expense, inflation)
            .run(years);
        let yearly = drawdown
            .series
            .iter()
            .map(|row| CorpusYear {
                year: row.year,
                age: input.current_age + row.year,
                opening_corpus: row.opening,
                interest: row.interest,
                expense: row.withdrawal,
                closing_corpus: row.closing,
            })
            .collect::<Vec<_>>();

        let real_rate = (1.0 + rate) / (1.0 + inflation) - 1.0;
        FdSustainabilityResult {
            sustainable: drawdown.sustainable(),
            depletion_age: drawdown
                .depletion_year
                .map(|year| input.current_age + year),
            final_corpus: drawdown.final_corpus,
            total_interest: yearly.iter().map(|row| row.interest).sum(),
            total_expenses: drawdown.total_withdrawn,
            real_return: real_rate * 100.0,
            withdrawal_rate: input.yearly_expense / input.initial_corpus * 100.0,
            sustainable_yearly_withdrawal: level_payment(input.initial_corpus, real_rate, years),
            yearly,
        }
    }

    fn insights(output: &FdSustainabilityResult, input: &FdSustainabilityInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<FdSustainabilityInput, FdSustainabilityResult>> {
    vec![
        Rule::success(
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| r.sustainable,
            |i: &FdSustainabilityInput, r: &FdSustainabilityResult| {
                format!(
                    "Your corpus lasts until age {} with {} left over",
                    i.life_expectancy,
                    rupees(r.final_corpus)
                )
            },
        ),
        Rule::warning(
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| r.depletion_age.is_some(),
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| {
                format!(
                    "Your corpus runs out at age {}; reduce expenses or find a higher real return",
                    r.depletion_age.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |i: &FdSustainabilityInput, _: &FdSustainabilityResult| {
                i.inflation_rate >= i.return_rate
            },
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| {
                format!(
                    "Inflation matches or beats the FD rate: the real return is {}",
                    pct(r.real_return)
                )
            },
        ),
        Rule::warning(
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| r.withdrawal_rate > 4.0,
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| {
                format!(
                    "Withdrawing {} of the corpus in year one is above the 4% guideline",
                    pct(r.withdrawal_rate)
                )
            },
        ),
        Rule::info(
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| r.withdrawal_rate <= 4.0,
            |_: &FdSustainabilityInput, r: &FdSustainabilityResult| {
                format!(
                    "A {} withdrawal rate is within the 4% guideline",
                    pct(r.withdrawal_rate)
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

    fn scenario_input() -> FdSustainabilityInput {
        FdSustainabilityInput {
            initial_corpus: 1_000_000.0,
            yearly_expense: 300_000.0,
            return_rate: 6.0,
            inflation_rate: 5.0,
            current_age: 40,
            life_expectancy: 85,
        }
    }

    #[test]
    fn scenario_heavy_withdrawal_depletes_early() {
        let input = scenario_input();
        let report = FdSustainability::run(&input).expect("valid input");
        let result = &report.results;

        // 1,000,000 -> 760,000 -> 490,600 -> 189,286 -> depleted in year 4
        assert_eq!(result.depletion_age, Some(44));
        assert!(!result.sustainable);
        assert_eq!(result.yearly.len(), 4);
        assert_approx_tol(result.yearly[0].closing_corpus, 760_000.0, 1e-6);
        assert_approx_tol(result.yearly[1].expense, 315_000.0, 1e-6);
        assert_eq!(result.final_corpus, 0.0);

        assert_eq!(report.insights[0].severity, Severity::Warning);
        assert!(report.insights[0].message.contains("age 44"));
    }

    #[test]
    fn modest_withdrawal_is_sustainable_to_life_expectancy() {
        let input = FdSustainabilityInput {
            yearly_expense: 30_000.0,
            inflation_rate: 3.0,
            return_rate: 7.0,
            ..scenario_input()
        };
        let report = FdSustainability::run(&input).expect("valid input");
        assert!(report.results.sustainable);
        assert_eq!(report.results.yearly.len(), 45);
        assert_eq!(report.results.yearly.last().map(|r| r.age), Some(85));
        assert_eq!(report.insights[0].severity, Severity::Success);
        assert!(report.insights[0].message.contains("age 85"));
        assert_eq!(
            report.insights.last().map(|i| i.severity),
            Some(Severity::Info)
        );
    }

    #[test]
    fn zero_rates_do_not_divide_by_zero() {
        let input = FdSustainabilityInput {
            return_rate: 0.0,
            inflation_rate: 0.0,
            ..scenario_input()
        };
        let result = FdSustainability::compute(&input);
        assert_approx_tol(result.sustainable_yearly_withdrawal, 1_000_000.0 / 45.0, 1e-6);
        assert!(result.real_return.abs() < 1e-12);
        assert_eq!(result.depletion_age, Some(44));
    }

    #[test]
    fn life_expectancy_must_exceed_current_age() {
        let errors = FdSustainability::validate(&FdSustainabilityInput {
            life_expectancy: 40,
            ..scenario_input()
        });
        assert!(errors.contains("lifeExpectancy"));
    }
}
