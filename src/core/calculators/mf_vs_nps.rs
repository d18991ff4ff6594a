use serde::{Deserialize, Serialize};

use crate::core::accumulation::Reinvestment;
use crate::core::insight::{Rule, evaluate, rupees};
use crate::core::types::{Calculator, FieldErrors, Insight};

/// Long-term capital gains tax on mutual fund gains at redemption.
pub const MF_LTCG_RATE: f64 = 0.10;
/// Yearly NPS contribution eligible for the additional deduction.
pub const NPS_DEDUCTION_LIMIT: f64 = 50_000.0;
/// Share of the NPS corpus that may be withdrawn tax-free at exit.
pub const NPS_LUMP_SUM_SHARE: f64 = 0.60;
pub const NPS_ANNUITY_SHARE: f64 = 0.40;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Scheme {
    #[serde(rename = "mf")]
    MutualFund,
    #[serde(rename = "nps")]
    Nps,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfVsNpsInput {
    pub monthly_investment: f64,
    pub years: u32,
    pub mf_return: f64,
    pub nps_return: f64,
    pub tax_bracket: f64,
    pub annuity_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeYear {
    pub year: u32,
    pub invested: f64,
    pub mf_value: f64,
    pub nps_value: f64,
    pub cumulative_tax_saving: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfVsNpsResult {
    pub total_invested: f64,
    pub mf_corpus: f64,
    pub mf_gain: f64,
    pub mf_tax: f64,
    pub mf_post_tax: f64,
    pub nps_corpus: f64,
    pub yearly_tax_saving: f64,
    pub total_tax_saving: f64,
    pub nps_lump_sum: f64,
    pub nps_annuity_corpus: f64,
    pub monthly_pension: f64,
    /// Lump sum plus annuity corpus plus accumulated tax savings.
    pub nps_total_benefit: f64,
    pub better_option: Scheme,
    pub difference: f64,
    pub yearly: Vec<SchemeYear>,
}

pub struct MfVsNps;

impl Calculator for MfVsNps {
    const NAME: &'static str = "mf-vs-nps";
    const TITLE: &'static str = "Mutual Fund vs NPS Calculator";

    type Input = MfVsNpsInput;
    type Output = MfVsNpsResult;

    fn validate(input: &MfVsNpsInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive(
            "monthlyInvestment",
            "Monthly investment",
            input.monthly_investment,
            1e8,
        );
        errors.int_range("years", "Investment period", input.years, 1, 45);
        errors.range("mfReturn", "Mutual fund return", input.mf_return, 0.0, 30.0);
        errors.range("npsReturn", "NPS return", input.nps_return, 0.0, 20.0);
        errors.range("taxBracket", "Tax bracket", input.tax_bracket, 0.0, 45.0);
        errors.range("annuityRate", "Annuity rate", input.annuity_rate, 0.0, 15.0);
        errors
    }

    fn compute(input: &MfVsNpsInput) -> MfVsNpsResult {
        let yearly_contribution = input.monthly_investment * 12.0;
        let mf = Reinvestment::new(0.0, yearly_contribution, input.mf_return / 100.0).run(input.years);
        let nps =
            Reinvestment::new(0.0, yearly_contribution, input.nps_return / 100.0).run(input.years);

        let mf_gain = mf.gain();
        let mf_tax = mf_gain.max(0.0) * MF_LTCG_RATE;
        let mf_post_tax = mf.final_value - mf_tax;

        let yearly_tax_saving =
            yearly_contribution.min(NPS_DEDUCTION_LIMIT) * input.tax_bracket / 100.0;
        let total_tax_saving = yearly_tax_saving * input.years as f64;
        let nps_lump_sum = nps.final_value * NPS_LUMP_SUM_SHARE;
        let nps_annuity_corpus = nps.final_value * NPS_ANNUITY_SHARE;
        let nps_total_benefit = nps_lump_sum + nps_annuity_corpus + total_tax_saving;

        let better_option = if mf_post_tax >= nps_total_benefit {
            Scheme::MutualFund
        } else {
            Scheme::Nps
        };

        let yearly = mf
            .series
            .iter()
            .zip(&nps.series)
            .map(|(mf_row, nps_row)| SchemeYear {
                year: mf_row.year,
                invested: mf_row.invested,
                mf_value: mf_row.value,
                nps_value: nps_row.value,
                cumulative_tax_saving: yearly_tax_saving * mf_row.year as f64,
            })
            .collect();

        MfVsNpsResult {
            total_invested: mf.contributed,
            mf_corpus: mf.final_value,
            mf_gain,
            mf_tax,
            mf_post_tax,
            nps_corpus: nps.final_value,
            yearly_tax_saving,
            total_tax_saving,
            nps_lump_sum,
            nps_annuity_corpus,
            monthly_pension: nps_annuity_corpus * input.annuity_rate / 100.0 / 12.0,
            nps_total_benefit,
            better_option,
            difference: (mf_post_tax - nps_total_benefit).abs(),
            yearly,
        }
    }

    fn insights(output: &MfVsNpsResult, input: &MfVsNpsInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<MfVsNpsInput, MfVsNpsResult>> {
    vec![
        Rule::success(
            |_: &MfVsNpsInput, r: &MfVsNpsResult| r.better_option == Scheme::MutualFund,
            |_: &MfVsNpsInput, r: &MfVsNpsResult| {
                format!(
                    "Mutual funds come out ahead by {} after capital gains tax",
                    rupees(r.difference)
                )
            },
        ),
        Rule::success(
            |_: &MfVsNpsInput, r: &MfVsNpsResult| r.better_option == Scheme::Nps,
            |_: &MfVsNpsInput, r: &MfVsNpsResult| {
                format!(
                    "NPS comes out ahead by {} once tax savings are counted",
                    rupees(r.difference)
                )
            },
        ),
        Rule::info(
            |_: &MfVsNpsInput, _: &MfVsNpsResult| true,
            |_: &MfVsNpsInput, r: &MfVsNpsResult| {
                format!(
                    "NPS is locked in until 60 and {} must buy an annuity, paying about {} a month",
                    rupees(r.nps_annuity_corpus),
                    rupees(r.monthly_pension)
                )
            },
        ),
        Rule::info(
            |_: &MfVsNpsInput, _: &MfVsNpsResult| true,
            |_: &MfVsNpsInput, _: &MfVsNpsResult| {
                "Mutual fund units can be redeemed at any time, which keeps the money available for emergencies".to_string()
            },
        ),
        Rule::info(
            |i: &MfVsNpsInput, _: &MfVsNpsResult| i.tax_bracket == 0.0,
            |_: &MfVsNpsInput, _: &MfVsNpsResult| {
                "With no taxable income the NPS deduction adds nothing".to_string()
            },
        ),
    ]
}
