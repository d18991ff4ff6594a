use serde::{Deserialize, Serialize};

use crate::core::amortization::amortize;
use crate::core::insight::{Rule, evaluate, pct, rupees};
use crate::core::solver::break_even;
use crate::core::types::{Calculator, FieldErrors, Insight};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentInput {
    pub property_price: f64,
    pub down_payment_pct: f64,
    pub loan_rate: f64,
    pub loan_term_years: u32,
    pub monthly_rent: f64,
    pub rent_increase: f64,
    pub property_appreciation: f64,
    pub investment_return: f64,
    /// Yearly upkeep as a percentage of the current property value.
    pub maintenance_pct: f64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentYear {
    pub year: u32,
    pub property_value: f64,
    pub loan_balance: f64,
    pub buying_net_worth: f64,
    pub yearly_rent: f64,
    pub buyer_outflow: f64,
    pub renting_net_worth: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Buy,
    Rent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyVsRentResult {
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_emi: f64,
    pub total_emi_paid: f64,
    pub total_interest: f64,
    pub total_rent_paid: f64,
    pub total_maintenance: f64,
    pub final_buying_net_worth: f64,
    pub final_renting_net_worth: f64,
    /// First year buying net worth reaches renting net worth.
    pub break_even_year: Option<u32>,
    pub better_option: Choice,
    pub advantage: f64,
    /// First-year rent as a percentage of the property price.
    pub rent_yield: f64,
    pub yearly: Vec<BuyVsRentYear>,
}

pub struct BuyVsRent;

impl Calculator for BuyVsRent {
    const NAME: &'static str = "buy-vs-rent";
    const TITLE: &'static str = "Buy vs Rent Calculator";

    type Input = BuyVsRentInput;
    type Output = BuyVsRentResult;

    fn validate(input: &BuyVsRentInput) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.positive("propertyPrice", "Property price", input.property_price, 1e10);
        errors.range(
            "downPaymentPct",
            "Down payment",
            input.down_payment_pct,
            0.0,
            100.0,
        );
        errors.check(
            input.down_payment_pct < 100.0,
            "downPaymentPct",
            "Down payment must be below 100% when financing with a loan",
        );
        errors.range("loanRate", "Loan rate", input.loan_rate, 0.0, 20.0);
        errors.int_range("loanTermYears", "Loan tenure", input.loan_term_years, 1, 30);
        errors.positive("monthlyRent", "Monthly rent", input.monthly_rent, 1e8);
        errors.range("rentIncrease", "Rent increase", input.rent_increase, 0.0, 20.0);
        errors.range(
            "propertyAppreciation",
            "Property appreciation",
            input.property_appreciation,
            0.0,
            20.0,
        );
        errors.range(
            "investmentReturn",
            "Investment return",
            input.investment_return,
            0.0,
            30.0,
        );
        errors.range("maintenancePct", "Maintenance", input.maintenance_pct, 0.0, 5.0);
        errors.int_range("horizonYears", "Comparison period", input.horizon_years, 1, 40);
        errors
    }

    fn compute(input: &BuyVsRentInput) -> BuyVsRentResult {
        let down_payment = input.property_price * input.down_payment_pct / 100.0;
        let loan_amount = input.property_price - down_payment;
        let loan = amortize(loan_amount, input.loan_rate, input.loan_term_years);

        let appreciation = input.property_appreciation / 100.0;
        let rent_increase = input.rent_increase / 100.0;
        let investment_return = input.investment_return / 100.0;
        let maintenance = input.maintenance_pct / 100.0;

        let mut portfolio = down_payment;
        let mut yearly = Vec::with_capacity(input.horizon_years as usize);
        let mut total_rent_paid = 0.0;
        let mut total_emi_paid = 0.0;
        let mut total_interest = 0.0;
        let mut total_maintenance = 0.0;
        for year in 1..=input.horizon_years {
            let property_value = input.property_price * (1.0 + appreciation).powf(year as f64);
            let loan_balance = loan.balance_after_year(loan_amount, year);
            let yearly_rent =
                input.monthly_rent * 12.0 * (1.0 + rent_increase).powf((year - 1) as f64);
            let (emi_paid, interest_paid) = loan
                .schedule
                .get(year as usize - 1)
                .map(|row| (row.payment, row.interest_paid))
                .unwrap_or((0.0, 0.0));
            let upkeep = property_value * maintenance;
            let buyer_outflow = emi_paid + upkeep;

            portfolio = portfolio * (1.0 + investment_return) + (buyer_outflow - yearly_rent);

            total_rent_paid += yearly_rent;
            total_emi_paid += emi_paid;
            total_interest += interest_paid;
            total_maintenance += upkeep;
            yearly.push(BuyVsRentYear {
                year,
                property_value,
                loan_balance,
                buying_net_worth: property_value - loan_balance,
                yearly_rent,
                buyer_outflow,
                renting_net_worth: portfolio,
            });
        }

        let buying = yearly
            .iter()
            .map(|row| row.buying_net_worth)
            .collect::<Vec<_>>();
        let renting = yearly
            .iter()
            .map(|row| row.renting_net_worth)
            .collect::<Vec<_>>();
        let final_buying_net_worth = buying.last().copied().unwrap_or(0.0);
        let final_renting_net_worth = renting.last().copied().unwrap_or(0.0);
        let better_option = if final_buying_net_worth >= final_renting_net_worth {
            Choice::Buy
        } else {
            Choice::Rent
        };

        BuyVsRentResult {
            down_payment,
            loan_amount,
            monthly_emi: loan.payment,
            total_emi_paid,
            total_interest,
            total_rent_paid,
            total_maintenance,
            final_buying_net_worth,
            final_renting_net_worth,
            break_even_year: break_even(&buying, &renting),
            better_option,
            advantage: (final_buying_net_worth - final_renting_net_worth).abs(),
            rent_yield: input.monthly_rent * 12.0 / input.property_price * 100.0,
            yearly,
        }
    }

    fn insights(output: &BuyVsRentResult, input: &BuyVsRentInput) -> Vec<Insight> {
        evaluate(&rules(), input, output)
    }
}

fn rules() -> Vec<Rule<BuyVsRentInput, BuyVsRentResult>> {
    vec![
        Rule::success(
            |_: &BuyVsRentInput, r: &BuyVsRentResult| r.break_even_year.is_some_and(|y| y <= 5),
            |_: &BuyVsRentInput, r: &BuyVsRentResult| {
                format!(
                    "Buying overtakes renting within {} years",
                    r.break_even_year.unwrap_or_default()
                )
            },
        ),
        Rule::info(
            |_: &BuyVsRentInput, r: &BuyVsRentResult| r.break_even_year.is_some_and(|y| y > 5),
            |_: &BuyVsRentInput, r: &BuyVsRentResult| {
                format!(
                    "Buying breaks even in year {}; it pays off only if you stay that long",
                    r.break_even_year.unwrap_or_default()
                )
            },
        ),
        Rule::warning(
            |_: &BuyVsRentInput, r: &BuyVsRentResult| r.break_even_year.is_none(),
            |i: &BuyVsRentInput, _: &BuyVsRentResult| {
                format!(
                    "Renting and investing the difference stays ahead for all {} years",
                    i.horizon_years
                )
            },
        ),
        Rule::info(
            |_: &BuyVsRentInput, r: &BuyVsRentResult| r.rent_yield < 3.0,
            |_: &BuyVsRentInput, r: &BuyVsRentResult| {
                format!(
                    "Rent is only {} of the price a year; renting is cheap relative to owning",
                    pct(r.rent_yield)
                )
            },
        ),
        Rule::info(
            |_: &BuyVsRentInput, r: &BuyVsRentResult| r.advantage > 0.0,
            |i: &BuyVsRentInput, r: &BuyVsRentResult| {
                let option = match r.better_option {
                    Choice::Buy => "Buying",
                    Choice::Rent => "Renting",
                };
                format!(
                    "{option} leaves you {} better off after {} years",
                    rupees(r.advantage),
                    i.horizon_years
                )
            },
        ),
    ]
}
