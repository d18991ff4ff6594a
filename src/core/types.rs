use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub message: String,
    pub severity: Severity,
}

impl Insight {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Field-keyed validation messages. Empty means the input may be computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Records the first message for a field; later messages for the same field are dropped.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.insert(field, message);
        }
    }

    pub fn range(&mut self, field: &str, label: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() {
            self.insert(field, format!("{label} must be a number"));
        } else if value < min || value > max {
            self.insert(
                field,
                format!("{label} must be between {min} and {max}"),
            );
        }
    }

    /// Accepts `(0, max]`, for amounts that must be strictly positive.
    pub fn positive(&mut self, field: &str, label: &str, value: f64, max: f64) {
        if !value.is_finite() {
            self.insert(field, format!("{label} must be a number"));
        } else if value <= 0.0 {
            self.insert(field, format!("{label} must be > 0"));
        } else if value > max {
            self.insert(field, format!("{label} must be at most {max}"));
        }
    }

    pub fn int_range(&mut self, field: &str, label: &str, value: u32, min: u32, max: u32) {
        if !(min..=max).contains(&value) {
            self.insert(
                field,
                format!("{label} must be between {min} and {max}"),
            );
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid input: {0}")]
    Validation(FieldErrors),
    #[error("unknown calculator '{0}'")]
    UnknownCalculator(String),
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("failed to encode report: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<R> {
    pub results: R,
    pub insights: Vec<Insight>,
}

/// A single dashboard calculator. Implementations are stateless: every call
/// depends on its arguments only.
pub trait Calculator {
    const NAME: &'static str;
    const TITLE: &'static str;

    type Input: DeserializeOwned;
    type Output: Serialize;

    fn validate(input: &Self::Input) -> FieldErrors;

    /// Callers must validate first; `run` does both.
    fn compute(input: &Self::Input) -> Self::Output;

    fn insights(output: &Self::Output, input: &Self::Input) -> Vec<Insight>;

    fn run(input: &Self::Input) -> Result<Report<Self::Output>, CalcError> {
        let errors = Self::validate(input);
        if !errors.is_empty() {
            tracing::debug!(
                calculator = Self::NAME,
                fields = errors.len(),
                "rejected input"
            );
            return Err(CalcError::Validation(errors));
        }

        let results = Self::compute(input);
        let insights = Self::insights(&results, input);
        tracing::debug!(
            calculator = Self::NAME,
            insights = insights.len(),
            "calculation complete"
        );
        Ok(Report { results, insights })
    }
}

/// Replaces a non-finite value with `fallback` so nothing like NaN reaches a report.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
