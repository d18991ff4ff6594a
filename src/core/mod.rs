pub mod accumulation;
pub mod amortization;
pub mod calculators;
pub mod decumulation;
pub mod insight;
pub mod solver;
mod types;

pub use types::{
    CalcError, Calculator, FieldErrors, Insight, Report, Severity, finite_or,
};
