use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight, finite_or};

/// Average year length used to turn a day count into years.
pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityReturnsInput {
    pub initial_investment: f64,
    pub current_value: f64,
    #[serde(default)]
    pub dividends: f64,
    pub investment_date: NaiveDate,
    /// Valuation date. Outer surfaces fill in today when it is missing.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub years: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityReturnsResult {
    pub holding_days: i64,
    pub holding_years: f64,
    pub total_value: f64,
    pub total_gain: f64,
    pub absolute_return_pct: f64,
    pub cagr: f64,
    pub annualized_return_pct: f64,
    pub real_return_pct: f64,
    /// Dividends as a share of the total gain, when there is a gain.
    pub dividend_share_pct: Option<f64>,
    pub growth: Vec<GrowthPoint>,
}

pub struct EquityReturns;

impl EquityReturnsInput {
    fn holding_days(&self) -> Option<i64> {
        self.as_of
            .map(|as_of| (as_of - self.investment_date).num_days())
    }

    /// Held for less than a calendar year, measured to the first anniversary.
    fn held_under_a_year(&self) -> bool {
        match (self.as_of, self.investment_date.checked_add_months(Months::new(12))) {
            (Some(as_of), Some(anniversary)) => as_of < anniversary,
            _ => false,
        }
    }
}

impl Calculator for EquityReturns {
    const NAME: &'static str = "equity-returns";
    const TITLE: &'static str = "Equity Returns (CAGR) Calculator";

    type Input = EquityReturnsInput;
    type Output = EquityReturnsResult;

    fn validate(input: &EquityReturnsInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive(
            "initialInvestment",
            "Initial investment",
            input.initial_investment,
            1e11,
        );
        errors.range(
            "currentValue",
            "Current value",
            input.current_value,
            0.0,
            1e11,
        );
        errors.range("dividends", "Dividends", input.dividends, 0.0, 1e11);
        errors.range(
            "inflationRate",
            "Inflation rate",
            input.inflation_rate,
            0.0,
            15.0,
        );
        match input.holding_days() {
            None => errors.insert("asOf", "Valuation date is required"),
            Some(days) => errors.check(
                days > 0,
                "investmentDate",
                "Investment date must be before the valuation date",
            ),
        }
        errors
    }

    fn compute(input: &EquityReturnsInput) -> EquityReturnsResult {
        let as_of = input.as_of.unwrap_or(input.investment_date);
        let holding_days = input.holding_days().unwrap_or(0).max(0);
        let holding_years = holding_days as f64 / DAYS_PER_YEAR;

        let total_value = input.current_value + input.dividends;
        let total_gain = total_value - input.initial_investment;
        let absolute_return_pct = finite_or(total_gain / input.initial_investment * 100.0, 0.0);
        let cagr = if holding_years > 0.0 {
            finite_or(
                (total_value / input.initial_investment).powf(1.0 / holding_years) - 1.0,
                0.0,
            )
        } else {
            0.0
        };
        let real_return_pct = ((1.0 + cagr) / (1.0 + input.inflation_rate / 100.0) - 1.0) * 100.0;

        let whole_years = holding_years.floor() as u32;
        let mut growth = (0..=whole_years)
            .filter_map(|year| {
                let date = input
                    .investment_date
                    .checked_add_months(Months::new(12 * year))?;
                Some(GrowthPoint {
                    date,
                    years: year as f64,
                    value: input.initial_investment * (1.0 + cagr).powf(year as f64),
                })
            })
            .filter(|point| point.date < as_of)
            .collect::<Vec<_>>();
        growth.push(GrowthPoint {
            date: as_of,
            years: holding_years,
            value: total_value,
        });

        EquityReturnsResult {
            holding_days,
            holding_years,
            total_value,
            total_gain,
            absolute_return_pct,
            cagr,
            annualized_return_pct: cagr * 100.0,
            real_return_pct,
            dividend_share_pct: (input.dividends > 0.0 && total_gain > 0.0)
                .then(|| input.dividends / total_gain * 100.0),
            growth,
        }
    }

    fn insights(output: &EquityReturnsResult, input: &EquityReturnsInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<EquityReturnsInput, EquityReturnsResult>> {
    vec![
        Rule::success(
            |_: &EquityReturnsInput, r: &EquityReturnsResult| r.annualized_return_pct > 15.0,
            |_: &EquityReturnsInput, r: &EquityReturnsResult| {
                format!(
                    "A CAGR of {} is outstanding for an equity holding",
                    pct(r.annualized_return_pct)
                )
            },
        ),
        Rule::warning(
            |_: &EquityReturnsInput, r: &EquityReturnsResult| r.real_return_pct < 0.0,
            |_: &EquityReturnsInput, r: &EquityReturnsResult| {
                format!(
                    "After inflation the investment lost {} a year in purchasing power",
                    pct(-r.real_return_pct)
                )
            },
        ),
        Rule::info(
            |_: &EquityReturnsInput, r: &EquityReturnsResult| r.annualized_return_pct < 12.0,
            |_: &EquityReturnsInput, r: &EquityReturnsResult| {
                format!(
                    "A CAGR of {} trails the long-run return of a broad index fund",
                    pct(r.annualized_return_pct)
                )
            },
        ),
        Rule::info(
            |i: &EquityReturnsInput, _: &EquityReturnsResult| i.dividends > 0.0,
            |i: &EquityReturnsInput, r: &EquityReturnsResult| match r.dividend_share_pct {
                Some(share) => format!(
                    "Dividends of {} make up {} of your gain",
                    rupees(i.dividends),
                    pct(share)
                ),
                None => format!("Dividends of {} cushioned the loss", rupees(i.dividends)),
            },
        ),
        Rule::warning(
            |i: &EquityReturnsInput, _: &EquityReturnsResult| i.held_under_a_year(),
            |_: &EquityReturnsInput, _: &EquityReturnsResult| {
                "Annualising a holding of less than a year exaggerates both gains and losses"
                    .to_string()
            },
        ),
    ]
}
