use serde::{Deserialize, Serialize};

use crate::core::accumulation::Reinvestment;
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDeferralInput {
    pub annual_contribution: f64,
    pub years: u32,
    pub expected_return: f64,
    pub current_tax_rate: f64,
    pub retirement_tax_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferralYear {
    pub year: u32,
    pub taxable_value: f64,
    pub deferred_value: f64,
    pub deferred_after_tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDeferralResult {
    pub taxable_final: f64,
    pub deferred_final: f64,
    pub deferred_tax_at_withdrawal: f64,
    pub deferred_after_tax: f64,
    pub deferral_benefit: f64,
    pub benefit_pct: f64,
    pub yearly: Vec<DeferralYear>,
}

pub struct TaxDeferral;

impl Calculator for TaxDeferral {
    const NAME: &'static str = "tax-deferral";
    const TITLE: &'static str = "Tax Deferral Calculator";

    type Input = TaxDeferralInput;
    type Output = TaxDeferralResult;

    fn validate(input: &TaxDeferralInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive(
            "annualContribution",
            "Annual contribution",
            input.annual_contribution,
            1e9,
        );
        errors.int_range("years", "Years", input.years, 1, 50);
        errors.range(
            "expectedReturn",
            "Expected return",
            input.expected_return,
            0.0,
            30.0,
        );
        errors.range(
            "currentTaxRate",
            "Current tax rate",
            input.current_tax_rate,
            0.0,
            60.0,
        );
        errors.range(
            "retirementTaxRate",
            "Retirement tax rate",
            input.retirement_tax_rate,
            0.0,
            60.0,
        );
        errors
    }

    fn compute(input: &TaxDeferralInput) -> TaxDeferralResult {
        let rate = input.expected_return / 100.0;
        let keep_now = 1.0 - input.current_tax_rate / 100.0;
        let keep_later = 1.0 - input.retirement_tax_rate / 100.0;

        // contributions come out of taxed income and growth is taxed every year
        let taxable =
            Reinvestment::new(0.0, input.annual_contribution * keep_now, rate * keep_now)
                .run(input.years);
        let deferred = Reinvestment::new(0.0, input.annual_contribution, rate).run(input.years);

        let yearly = taxable
            .series
            .iter()
            .zip(&deferred.series)
            .map(|(taxed, sheltered)| DeferralYear {
                year: taxed.year,
                taxable_value: taxed.value,
                deferred_value: sheltered.value,
                deferred_after_tax: sheltered.value * keep_later,
            })
            .collect();

        let deferred_after_tax = deferred.final_value * keep_later;
        let deferral_benefit = deferred_after_tax - taxable.final_value;

        TaxDeferralResult {
            taxable_final: taxable.final_value,
            deferred_final: deferred.final_value,
            deferred_tax_at_withdrawal: deferred.final_value - deferred_after_tax,
            deferred_after_tax,
            deferral_benefit,
            benefit_pct: if taxable.final_value > 0.0 {
                deferral_benefit / taxable.final_value * 100.0
            } else {
                0.0
            },
            yearly,
        }
    }

    fn insights(output: &TaxDeferralResult, input: &TaxDeferralInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<TaxDeferralInput, TaxDeferralResult>> {
    vec![
        Rule::success(
            |_: &TaxDeferralInput, r: &TaxDeferralResult| r.deferral_benefit > 0.0,
            |_: &TaxDeferralInput, r: &TaxDeferralResult| {
                format!(
                    "Deferring tax leaves you {} better off ({} more)",
                    rupees(r.deferral_benefit),
                    pct(r.benefit_pct)
                )
            },
        ),
        Rule::warning(
            |i: &TaxDeferralInput, _: &TaxDeferralResult| {
                i.retirement_tax_rate > i.current_tax_rate
            },
            |_: &TaxDeferralInput, _: &TaxDeferralResult| {
                "A higher tax rate in retirement eats into the value of deferring".to_string()
            },
        ),
        Rule::warning(
            |_: &TaxDeferralInput, r: &TaxDeferralResult| r.deferral_benefit <= 0.0,
            |_: &TaxDeferralInput, _: &TaxDeferralResult| {
                "Paying tax now is at least as good as deferring it for these rates".to_string()
            },
        ),
        Rule::info(
            |i: &TaxDeferralInput, _: &TaxDeferralResult| i.years >= 20,
            |i: &TaxDeferralInput, _: &TaxDeferralResult| {
                format!(
                    "Over {} years, untaxed compounding is where most of the benefit comes from",
                    i.years
                )
            },
        ),
    ]
}
