use serde::{Deserialize, Serialize};

use crate::core::amortization::{AmortizationYear, amortize};
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiInput {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResult {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    /// Total interest as a percentage of the principal.
    pub interest_to_principal: f64,
    pub schedule: Vec<AmortizationYear>,
}

pub struct Emi;

impl Calculator for Emi {
    const NAME: &'static str = "emi";
    const TITLE: &'static str = "EMI Calculator";

    type Input = EmiInput;
    type Output = EmiResult;

    fn validate(input: &EmiInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.range(
            "principal",
            "Loan amount",
            input.principal,
            10_000.0,
            100_000_000.0,
        );
        errors.range("annualRate", "Interest rate", input.annual_rate, 1.0, 30.0);
        errors.int_range("termYears", "Loan tenure", input.term_years, 1, 30);
        errors
    }

    fn compute(input: &EmiInput) -> EmiResult {
        let loan = amortize(input.principal, input.annual_rate, input.term_years);
        let interest_to_principal = if input.principal > 0.0 {
            loan.total_interest / input.principal * 100.0
        } else {
            0.0
        };

        EmiResult {
            monthly_payment: loan.payment,
            total_payment: loan.total_paid,
            total_interest: loan.total_interest,
            interest_to_principal,
            schedule: loan.schedule,
        }
    }

    fn insights(output: &EmiResult, input: &EmiInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<EmiInput, EmiResult>> {
    vec![
        Rule::warning(
            |i: &EmiInput, r: &EmiResult| r.total_interest > i.principal,
            |_: &EmiInput, r: &EmiResult| {
                format!(
                    "You will pay {} in interest, more than the loan itself",
                    rupees(r.total_interest)
                )
            },
        ),
        Rule::warning(
            |i: &EmiInput, _: &EmiResult| i.annual_rate > 12.0,
            |i: &EmiInput, _: &EmiResult| {
                format!(
                    "An interest rate of {} is high; compare lenders or consider a balance transfer",
                    pct(i.annual_rate)
                )
            },
        ),
        Rule::info(
            |i: &EmiInput, _: &EmiResult| i.term_years > 20,
            |_: &EmiInput, _: &EmiResult| {
                "Long tenures keep the EMI low but add interest; part-prepayments early in the loan save the most"
                    .to_string()
            },
        ),
        Rule::success(
            |_: &EmiInput, r: &EmiResult| r.interest_to_principal <= 50.0,
            |_: &EmiInput, r: &EmiResult| {
                format!(
                    "Interest is {} of the principal, a manageable cost of borrowing",
                    pct(r.interest_to_principal)
                )
            },
        ),
    ]
}
