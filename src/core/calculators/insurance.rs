use serde::{Deserialize, Serialize};

use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

const EXPENSE_YEARS: f64 = 15.0;
const INCOME_REPLACEMENT_YEARS: f64 = 15.0;
const EMERGENCY_INCOME_MULTIPLE: f64 = 2.0;
/// Linear premium proxy: base rate per rupee of cover, loaded 3% per year of age above 18.
const BASE_PREMIUM_RATE: f64 = 0.0005;
const AGE_LOADING_PER_YEAR: f64 = 0.03;
const MIN_ENTRY_AGE: u32 = 18;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInput {
    pub age: u32,
    pub annual_income: f64,
    pub annual_expenses: f64,
    pub outstanding_loans: f64,
    pub children: u32,
    pub education_cost_per_child: f64,
    pub spouse_income: f64,
    pub existing_coverage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedBreakdown {
    pub expense_cover: f64,
    pub loans: f64,
    pub education: f64,
    pub income_replacement: f64,
    pub emergency_buffer: f64,
}

impl NeedBreakdown {
    fn total(self) -> f64 {
        self.expense_cover + self.loans + self.education + self.income_replacement + self.emergency_buffer
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceResult {
    pub breakdown: NeedBreakdown,
    pub gross_need: f64,
    pub existing_coverage: f64,
    pub recommended_cover: f64,
    pub estimated_annual_premium: f64,
    /// Existing cover as a fraction of the gross need.
    pub coverage_ratio: f64,
    pub income_multiple: f64,
}

pub struct Insurance;

impl Calculator for Insurance {
    const NAME: &'static str = "insurance";
    const TITLE: &'static str = "Life Insurance Needs Calculator";

    type Input = InsuranceInput;
    type Output = InsuranceResult;

    fn validate(input: &InsuranceInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.int_range("age", "Age", input.age, MIN_ENTRY_AGE, 65);
        errors.positive("annualIncome", "Annual income", input.annual_income, 1e9);
        errors.range(
            "annualExpenses",
            "Annual expenses",
            input.annual_expenses,
            0.0,
            1e9,
        );
        errors.range(
            "outstandingLoans",
            "Outstanding loans",
            input.outstanding_loans,
            0.0,
            1e10,
        );
        errors.int_range("children", "Number of children", input.children, 0, 10);
        errors.range(
            "educationCostPerChild",
            "Education cost per child",
            input.education_cost_per_child,
            0.0,
            1e8,
        );
        errors.range("spouseIncome", "Spouse income", input.spouse_income, 0.0, 1e9);
        errors.range(
            "existingCoverage",
            "Existing coverage",
            input.existing_coverage,
            0.0,
            1e10,
        );
        errors
    }

    fn compute(input: &InsuranceInput) -> InsuranceResult {
        let breakdown = NeedBreakdown {
            expense_cover: input.annual_expenses * EXPENSE_YEARS,
            loans: input.outstanding_loans,
            education: input.education_cost_per_child * input.children as f64,
            income_replacement: ((input.annual_income - input.spouse_income)
                * INCOME_REPLACEMENT_YEARS)
                .max(0.0),
            emergency_buffer: input.annual_income * EMERGENCY_INCOME_MULTIPLE,
        };
        let gross_need = breakdown.total();
        let recommended_cover = (gross_need - input.existing_coverage).max(0.0);
        let age_loading =
            1.0 + AGE_LOADING_PER_YEAR * input.age.saturating_sub(MIN_ENTRY_AGE) as f64;
        let coverage_ratio = if gross_need > 0.0 {
            input.existing_coverage / gross_need
        } else {
            1.0
        };
        let income_multiple = if input.annual_income > 0.0 {
            recommended_cover / input.annual_income
        } else {
            0.0
        };

        InsuranceResult {
            breakdown,
            gross_need,
            existing_coverage: input.existing_coverage,
            recommended_cover,
            estimated_annual_premium: recommended_cover * BASE_PREMIUM_RATE * age_loading,
            coverage_ratio,
            income_multiple,
        }
    }

    fn insights(output: &InsuranceResult, input: &InsuranceInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<InsuranceInput, InsuranceResult>> {
    vec![
        Rule::success(
            |_: &InsuranceInput, r: &InsuranceResult| r.recommended_cover <= 0.0,
            |_: &InsuranceInput, _: &InsuranceResult| {
                "Your existing cover meets your estimated need".to_string()
            },
        ),
        Rule::warning(
            |_: &InsuranceInput, r: &InsuranceResult| r.coverage_ratio < 0.5,
            |_: &InsuranceInput, r: &InsuranceResult| {
                format!(
                    "Existing cover is only {} of what your family would need; consider a term plan of {}",
                    pct(r.coverage_ratio * 100.0),
                    rupees(r.recommended_cover)
                )
            },
        ),
        Rule::info(
            |i: &InsuranceInput, _: &InsuranceResult| i.age > 45,
            |_: &InsuranceInput, _: &InsuranceResult| {
                "Premiums rise steeply after 45; lock in cover sooner rather than later".to_string()
            },
        ),
        Rule::info(
            |i: &InsuranceInput, _: &InsuranceResult| i.children > 0,
            |_: &InsuranceInput, r: &InsuranceResult| {
                format!(
                    "{} of the need covers children's education",
                    rupees(r.breakdown.education)
                )
            },
        ),
        Rule::info(
            |_: &InsuranceInput, r: &InsuranceResult| r.income_multiple > 20.0,
            |_: &InsuranceInput, r: &InsuranceResult| {
                format!(
                    "The additional cover is {:.0}x your income; insurers may cap cover by income",
                    r.income_multiple
                )
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Severity;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_input() -> InsuranceInput {
        InsuranceInput {
            age: 35,
            annual_income: 1_200_000.0,
            annual_expenses: 600_000.0,
            outstanding_loans: 2_000_000.0,
            children: 2,
            education_cost_per_child: 1_500_000.0,
            spouse_income: 400_000.0,
            existing_coverage: 5_000_000.0,
        }
    }

    #[test]
    fn oracle_additive_need_and_premium() {
        let result = Insurance::compute(&sample_input());
        assert_approx(result.breakdown.expense_cover, 9_000_000.0);
        assert_approx(result.breakdown.education, 3_000_000.0);
        assert_approx(result.breakdown.income_replacement, 12_000_000.0);
        assert_approx(result.breakdown.emergency_buffer, 2_400_000.0);
        assert_approx(result.gross_need, 28_400_000.0);
        assert_approx(result.recommended_cover, 23_400_000.0);
        // 23.4M * 0.0005 * (1 + 0.03 * 17)
        assert_approx(result.estimated_annual_premium, 23_400_000.0 * 0.0005 * 1.51);
    }

    #[test]
    fn spouse_earning_more_does_not_reduce_need_below_zero() {
        let result = Insurance::compute(&InsuranceInput {
            spouse_income: 3_000_000.0,
            ..sample_input()
        });
        assert_approx(result.breakdown.income_replacement, 0.0);
    }

    #[test]
    fn over_insured_is_floored_at_zero() {
        let report = Insurance::run(&InsuranceInput {
            existing_coverage: 50_000_000.0,
            children: 0,
            ..sample_input()
        })
        .expect("valid input");
        assert_approx(report.results.recommended_cover, 0.0);
        assert_approx(report.results.estimated_annual_premium, 0.0);
        assert_eq!(report.insights.len(), 1);
        assert_eq!(report.insights[0].severity, Severity::Success);
    }

    #[test]
    fn under_insured_family_gets_warning_and_education_note() {
        let report = Insurance::run(&InsuranceInput {
            existing_coverage: 0.0,
            age: 50,
            ..sample_input()
        })
        .expect("valid input");
        let severities = report
            .insights
            .iter()
            .map(|i| i.severity)
            .collect::<Vec<_>>();
        assert_eq!(
            severities,
            vec![
                Severity::Warning,
                Severity::Info,
                Severity::Info,
                Severity::Info
            ]
        );
    }
}
