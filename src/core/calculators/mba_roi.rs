use serde::{Deserialize, Serialize};

use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::solver::first_crossing;
use crate::core::types::{Calculator, FieldErrors, Insight};

/// Fixed post-MBA comparison window, independent of every input.
pub const MBA_HORIZON_YEARS: u32 = 10;
/// Salary growth without the degree, as a fraction of the with-MBA growth rate.
pub const WITHOUT_MBA_GROWTH_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MbaRoiInput {
    pub tuition_cost: f64,
    pub living_cost: f64,
    pub program_years: u32,
    pub current_salary: f64,
    pub post_mba_salary: f64,
    pub salary_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryYear {
    pub year: u32,
    pub with_mba: f64,
    pub without_mba: f64,
    pub differential: f64,
    pub cumulative_differential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MbaRoiResult {
    pub opportunity_cost: f64,
    pub total_investment: f64,
    pub cumulative_gain: f64,
    pub net_gain: f64,
    pub roi_pct: f64,
    pub break_even_year: Option<u32>,
    pub salary_uplift_pct: Option<f64>,
    pub yearly: Vec<SalaryYear>,
}

pub struct MbaRoi;

impl Calculator for MbaRoi {
    const NAME: &'static str = "mba-roi";
    const TITLE: &'static str = "MBA ROI Calculator";

    type Input = MbaRoiInput;
    type Output = MbaRoiResult;

    fn validate(input: &MbaRoiInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.range("tuitionCost", "Tuition cost", input.tuition_cost, 0.0, 1e9);
        errors.range("livingCost", "Living cost", input.living_cost, 0.0, 1e9);
        errors.int_range("programYears", "Program length", input.program_years, 1, 3);
        errors.range(
            "currentSalary",
            "Current salary",
            input.current_salary,
            0.0,
            1e9,
        );
        errors.positive(
            "postMbaSalary",
            "Post-MBA salary",
            input.post_mba_salary,
            1e9,
        );
        errors.range("salaryGrowth", "Salary growth", input.salary_growth, 0.0, 30.0);
        errors
    }

    fn compute(input: &MbaRoiInput) -> MbaRoiResult {
        let growth = input.salary_growth / 100.0;
        let without_growth = growth * WITHOUT_MBA_GROWTH_FACTOR;
        let opportunity_cost = input.current_salary * input.program_years as f64;
        let total_investment = input.tuition_cost + input.living_cost + opportunity_cost;

        let mut cumulative = 0.0;
        let yearly = (1..=MBA_HORIZON_YEARS)
            .map(|year| {
                let exponent = (year - 1) as f64;
                let with_mba = input.post_mba_salary * (1.0 + growth).powf(exponent);
                let without_mba = input.current_salary * (1.0 + without_growth).powf(exponent);
                let differential = with_mba - without_mba;
                cumulative += differential;
                SalaryYear {
                    year,
                    with_mba,
                    without_mba,
                    differential,
                    cumulative_differential: cumulative,
                }
            })
            .collect::<Vec<_>>();

        let break_even_year = first_crossing(
            yearly.iter().map(|row| row.cumulative_differential),
            |gain| gain >= total_investment,
        );
        let net_gain = cumulative - total_investment;
        let roi_pct = if total_investment > 0.0 {
            net_gain / total_investment * 100.0
        } else {
            0.0
        };
        let salary_uplift_pct = (input.current_salary > 0.0)
            .then(|| (input.post_mba_salary - input.current_salary) / input.current_salary * 100.0);

        MbaRoiResult {
            opportunity_cost,
            total_investment,
            cumulative_gain: cumulative,
            net_gain,
            roi_pct,
            break_even_year,
            salary_uplift_pct,
            yearly,
        }
    }

    fn insights(output: &MbaRoiResult, input: &MbaRoiInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<MbaRoiInput, MbaRoiResult>> {
    vec![
        Rule::success(
            |_: &MbaRoiInput, r: &MbaRoiResult| r.roi_pct > 200.0,
            |_: &MbaRoiInput, r: &MbaRoiResult| {
                format!(
                    "Excellent ROI of {} over {MBA_HORIZON_YEARS} years",
                    pct(r.roi_pct)
                )
            },
        ),
        Rule::success(
            |_: &MbaRoiInput, r: &MbaRoiResult| r.break_even_year.is_some_and(|y| y <= 3),
            |_: &MbaRoiInput, r: &MbaRoiResult| {
                format!(
                    "The degree pays for itself within {} years of graduating",
                    r.break_even_year.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |_: &MbaRoiInput, r: &MbaRoiResult| r.break_even_year.is_none(),
            |_: &MbaRoiInput, r: &MbaRoiResult| {
                format!(
                    "The extra earnings do not recover the {} investment within {MBA_HORIZON_YEARS} years",
                    rupees(r.total_investment)
                )
            },
        ),
        Rule::warning(
            |_: &MbaRoiInput, r: &MbaRoiResult| r.roi_pct < 0.0,
            |_: &MbaRoiInput, r: &MbaRoiResult| {
                format!("Net loss of {} over the comparison window", rupees(-r.net_gain))
            },
        ),
        Rule::info(
            |_: &MbaRoiInput, r: &MbaRoiResult| r.salary_uplift_pct.is_some_and(|u| u < 30.0),
            |_: &MbaRoiInput, r: &MbaRoiResult| {
                format!(
                    "A salary jump of {} is modest; check placement reports for the programme",
                    pct(r.salary_uplift_pct.unwrap_or_default())
                )
            },
        ),
    ]
}
