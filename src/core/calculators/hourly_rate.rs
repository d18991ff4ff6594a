use serde::{Deserialize, Serialize};

use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

pub const PREMIUM_MULTIPLIER: f64 = 1.5;
pub const PROJECTION_YEARS: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRateInput {
    pub annual_expenses: f64,
    pub savings_goal: f64,
    pub tax_rate: f64,
    pub hours_per_week: f64,
    pub working_weeks: u32,
    pub non_billable_hours_per_week: f64,
    pub profit_margin: f64,
    pub rate_increase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateYear {
    pub year: u32,
    pub hourly_rate: f64,
    pub gross_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRateResult {
    pub target_income: f64,
    pub total_hours: f64,
    pub billable_hours: f64,
    /// Billable share of working hours, in percent.
    pub utilization: f64,
    pub minimum_rate: f64,
    pub recommended_rate: f64,
    pub premium_rate: f64,
    pub projection: Vec<RateYear>,
}

pub struct HourlyRate;

impl Calculator for HourlyRate {
    const NAME: &'static str = "hourly-rate";
    const TITLE: &'static str = "Freelancer Hourly Rate Calculator";

    type Input = HourlyRateInput;
    type Output = HourlyRateResult;

    fn validate(input: &HourlyRateInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive(
            "annualExpenses",
            "Annual expenses",
            input.annual_expenses,
            1e9,
        );
        errors.range("savingsGoal", "Savings goal", input.savings_goal, 0.0, 1e9);
        errors.range("taxRate", "Tax rate", input.tax_rate, 0.0, 60.0);
        errors.check(input.tax_rate < 60.0, "taxRate", "Tax rate must be below 60");
        errors.positive("hoursPerWeek", "Hours per week", input.hours_per_week, 100.0);
        errors.int_range("workingWeeks", "Working weeks", input.working_weeks, 1, 52);
        errors.range(
            "nonBillableHoursPerWeek",
            "Non-billable hours",
            input.non_billable_hours_per_week,
            0.0,
            100.0,
        );
        errors.check(
            input.non_billable_hours_per_week < input.hours_per_week,
            "nonBillableHoursPerWeek",
            "Non-billable hours must be fewer than hours per week",
        );
        errors.range(
            "profitMargin",
            "Profit margin",
            input.profit_margin,
            0.0,
            100.0,
        );
        errors.range(
            "rateIncrease",
            "Yearly rate increase",
            input.rate_increase,
            0.0,
            30.0,
        );
        errors
    }

    fn compute(input: &HourlyRateInput) -> HourlyRateResult {
        let tax = input.tax_rate / 100.0;
        let target_income = (input.annual_expenses + input.savings_goal) / (1.0 - tax);
        let weeks = input.working_weeks as f64;
        let total_hours = input.hours_per_week * weeks;
        let billable_hours = (total_hours - input.non_billable_hours_per_week * weeks).max(0.0);

        let minimum_rate = if billable_hours > 0.0 {
            target_income / billable_hours
        } else {
            0.0
        };
        let recommended_rate = minimum_rate * (1.0 + input.profit_margin / 100.0);
        let utilization = if total_hours > 0.0 {
            billable_hours / total_hours * 100.0
        } else {
            0.0
        };

        let increase = input.rate_increase / 100.0;
        let projection = (1..=PROJECTION_YEARS)
            .map(|year| {
                let hourly_rate = recommended_rate * (1.0 + increase).powf((year - 1) as f64);
                RateYear {
                    year,
                    hourly_rate,
                    gross_income: hourly_rate * billable_hours,
                }
            })
            .collect();

        HourlyRateResult {
            target_income,
            total_hours,
            billable_hours,
            utilization,
            minimum_rate,
            recommended_rate,
            premium_rate: recommended_rate * PREMIUM_MULTIPLIER,
            projection,
        }
    }

    fn insights(output: &HourlyRateResult, input: &HourlyRateInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<HourlyRateInput, HourlyRateResult>> {
    vec![
        Rule::warning(
            |_: &HourlyRateInput, r: &HourlyRateResult| r.utilization < 60.0,
            |_: &HourlyRateInput, r: &HourlyRateResult| {
                format!(
                    "Only {} of your hours are billable; trim admin time or raise your rate",
                    pct(r.utilization)
                )
            },
        ),
        Rule::warning(
            |_: &HourlyRateInput, r: &HourlyRateResult| r.utilization > 85.0,
            |_: &HourlyRateInput, r: &HourlyRateResult| {
                format!(
                    "{} utilization leaves little room for sales, learning or rest",
                    pct(r.utilization)
                )
            },
        ),
        Rule::success(
            |_: &HourlyRateInput, r: &HourlyRateResult| {
                (60.0..=85.0).contains(&r.utilization)
            },
            |_: &HourlyRateInput, r: &HourlyRateResult| {
                format!(
                    "Charge at least {} an hour; {} leaves room for your margin",
                    rupees(r.minimum_rate),
                    rupees(r.recommended_rate)
                )
            },
        ),
        Rule::info(
            |i: &HourlyRateInput, _: &HourlyRateResult| i.profit_margin < 10.0,
            |_: &HourlyRateInput, _: &HourlyRateResult| {
                "A margin under 10% leaves no buffer for slow months".to_string()
            },
        ),
        Rule::info(
            |i: &HourlyRateInput, _: &HourlyRateResult| i.tax_rate > 30.0,
            |i: &HourlyRateInput, _: &HourlyRateResult| {
                format!(
                    "At a {} tax rate, business expense deductions make a real difference",
                    pct(i.tax_rate)
                )
            },
        ),
    ]
}
