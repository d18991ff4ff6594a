use serde::{Deserialize, Serialize};

use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

/// Flat rate applied to every gain. No indexation and no short/long-term split.
pub const CAPITAL_GAINS_TAX_RATE: f64 = 0.20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsInput {
    pub purchase_price: f64,
    pub sale_price: f64,
    pub holding_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsResult {
    pub capital_gain: f64,
    pub capital_loss: f64,
    pub tax_rate: f64,
    pub tax_liability: f64,
    pub net_proceeds: f64,
    /// Tax as a percentage of the sale price.
    pub effective_tax_rate: f64,
    pub indexation_applied: bool,
}

pub struct CapitalGains;

impl Calculator for CapitalGains {
    const NAME: &'static str = "capital-gains";
    const TITLE: &'static str = "Capital Gains Tax Calculator";

    type Input = CapitalGainsInput;
    type Output = CapitalGainsResult;

    fn validate(input: &CapitalGainsInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive(
            "purchasePrice",
            "Purchase price",
            input.purchase_price,
            1e10,
        );
        errors.range("salePrice", "Sale price", input.sale_price, 0.0, 1e10);
        errors.range(
            "holdingYears",
            "Holding period",
            input.holding_years,
            0.0,
            50.0,
        );
        errors
    }

    fn compute(input: &CapitalGainsInput) -> CapitalGainsResult {
        let gain = input.sale_price - input.purchase_price;
        let capital_gain = gain.max(0.0);
        let tax_liability = capital_gain * CAPITAL_GAINS_TAX_RATE;
        let effective_tax_rate = if input.sale_price > 0.0 {
            tax_liability / input.sale_price * 100.0
        } else {
            0.0
        };

        CapitalGainsResult {
            capital_gain,
            capital_loss: (-gain).max(0.0),
            tax_rate: CAPITAL_GAINS_TAX_RATE * 100.0,
            tax_liability,
            net_proceeds: input.sale_price - tax_liability,
            effective_tax_rate,
            indexation_applied: false,
        }
    }

    fn insights(output: &CapitalGainsResult, input: &CapitalGainsInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<CapitalGainsInput, CapitalGainsResult>> {
    vec![
        Rule::info(
            |_: &CapitalGainsInput, r: &CapitalGainsResult| r.capital_loss > 0.0,
            |_: &CapitalGainsInput, r: &CapitalGainsResult| {
                format!(
                    "You have a capital loss of {}; it can be set off against other capital gains",
                    rupees(r.capital_loss)
                )
            },
        ),
        Rule::info(
            |_: &CapitalGainsInput, r: &CapitalGainsResult| r.capital_gain > 0.0,
            |_: &CapitalGainsInput, r: &CapitalGainsResult| {
                format!(
                    "Tax of {} at a flat {} on a gain of {} ({} of the sale value)",
                    rupees(r.tax_liability),
                    pct(r.tax_rate),
                    rupees(r.capital_gain),
                    pct(r.effective_tax_rate)
                )
            },
        ),
        Rule::info(
            |_: &CapitalGainsInput, r: &CapitalGainsResult| !r.indexation_applied,
            |_: &CapitalGainsInput, _: &CapitalGainsResult| {
                "Indexation benefit is not applied; the liability shown uses the flat rate only"
                    .to_string()
            },
        ),
        Rule::warning(
            |i: &CapitalGainsInput, r: &CapitalGainsResult| {
                i.holding_years < 1.0 && r.capital_gain > 0.0
            },
            |_: &CapitalGainsInput, _: &CapitalGainsResult| {
                "Assets held under a year may attract short-term rates, which this estimate does not model"
                    .to_string()
            },
        ),
    ]
}
