use super::types::{Insight, Severity};

/// One threshold rule: a predicate over the validated input and the computed
/// result, plus the message it contributes when it fires.
pub struct Rule<I, R> {
    pub severity: Severity,
    pub fires: fn(&I, &R) -> bool,
    pub message: fn(&I, &R) -> String,
}

impl<I, R> Rule<I, R> {
    pub fn success(fires: fn(&I, &R) -> bool, message: fn(&I, &R) -> String) -> Self {
        Self {
            severity: Severity::Success,
            fires,
            message,
        }
    }

    pub fn warning(fires: fn(&I, &R) -> bool, message: fn(&I, &R) -> String) -> Self {
        Self {
            severity: Severity::Warning,
            fires,
            message,
        }
    }

    pub fn info(fires: fn(&I, &R) -> bool, message: fn(&I, &R) -> String) -> Self {
        Self {
            severity: Severity::Info,
            fires,
            message,
        }
    }
}

/// Evaluates every rule in order. All rules that fire contribute; order only
/// affects the order of the returned insights.
pub fn evaluate<I, R>(rules: &[Rule<I, R>], input: &I, result: &R) -> Vec<Insight> {
    rules
        .iter()
        .filter(|rule| (rule.fires)(input, result))
        .map(|rule| Insight::new(rule.severity, (rule.message)(input, result)))
        .collect()
}

/// Whole-rupee rendering for insight text. Lakh/crore grouping is left to
/// the presentation layer.
pub fn rupees(amount: f64) -> String {
    format!("₹{amount:.0}")
}

pub fn pct(value: f64) -> String {
    format!("{value:.1}%")
}
