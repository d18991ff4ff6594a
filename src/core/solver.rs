//! Searches over yearly projections: first crossing of a target, break-even
//! between two parallel series, and the contribution needed to reach a goal.

/// First 1-based period whose value satisfies `reached`, scanning in order.
pub fn first_crossing<I>(values: I, reached: impl Fn(f64) -> bool) -> Option<u32>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .position(reached)
        .map(|index| index as u32 + 1)
}

/// First 1-based period in which `leader` is at least `trailer`.
/// Only periods present in both series are compared.
pub fn break_even(leader: &[f64], trailer: &[f64]) -> Option<u32> {
    leader
        .iter()
        .zip(trailer)
        .position(|(lead, trail)| lead >= trail)
        .map(|index| index as u32 + 1)
}

/// Yearly contribution that makes the reinvestment recurrence
/// `amount = amount * (1 + r) + c` reach `target` after `years`.
pub fn required_yearly_contribution(initial: f64, annual_rate: f64, years: u32, target: f64) -> f64 {
    if years == 0 {
        return 0.0;
    }
    let n = years as f64;
    let growth = (1.0 + annual_rate).powf(n);
    let gap = target - initial * growth;
    if gap <= 0.0 {
        return 0.0;
    }
    if annual_rate.abs() <= 1e-12 {
        return gap / n;
    }
    gap * annual_rate / (growth - 1.0)
}

/// Bisection for the rate at which the increasing function `value_at(rate)`
/// reaches `target`. Returns `None` when the bracket does not contain it.
pub fn solve_rate(
    value_at: impl Fn(f64) -> f64,
    target: f64,
    mut low: f64,
    mut high: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Option<f64> {
    let low_value = value_at(low);
    let high_value = value_at(high);
    if !(low_value.is_finite() && high_value.is_finite()) {
        return None;
    }
    if low_value > target || high_value < target {
        return None;
    }

    for _ in 0..max_iterations {
        let mid = 0.5 * (low + high);
        if value_at(mid) < target {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= tolerance {
            break;
        }
    }
    Some(0.5 * (low + high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accumulation::Reinvestment;
    use proptest::prelude::{prop_assert, proptest};

    #[test]
    fn first_crossing_reports_first_not_last() {
        let values = [1.0, 5.0, 3.0, 7.0];
        assert_eq!(first_crossing(values, |v| v >= 5.0), Some(2));
        assert_eq!(first_crossing(values, |v| v >= 10.0), None);
        assert_eq!(first_crossing(Vec::<f64>::new(), |v| v >= 0.0), None);
    }

    #[test]
    fn break_even_compares_pairwise() {
        let buy = [10.0, 20.0, 35.0, 50.0];
        let rent = [30.0, 32.0, 34.0, 36.0];
        assert_eq!(break_even(&buy, &rent), Some(3));
        assert_eq!(break_even(&rent[..1], &buy), Some(1));
        assert_eq!(break_even(&[1.0, 2.0], &[3.0, 4.0]), None);
    }

    #[test]
    fn required_contribution_zero_rate_and_already_funded() {
        assert_eq!(required_yearly_contribution(0.0, 0.0, 10, 1_000.0), 100.0);
        assert_eq!(required_yearly_contribution(2_000.0, 0.05, 10, 1_000.0), 0.0);
        assert_eq!(required_yearly_contribution(0.0, 0.05, 0, 1_000.0), 0.0);
    }

    #[test]
    fn solve_rate_recovers_known_growth_rate() {
        let rate = solve_rate(|r| 1_000.0 * (1.0 + r).powi(10), 2_593.742_460_1, -0.5, 1.0, 1e-10, 200)
            .expect("bracketed");
        assert!((rate - 0.10).abs() < 1e-8, "got {rate}");
        assert_eq!(solve_rate(|r| r, 5.0, 0.0, 1.0, 1e-9, 100), None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_required_contribution_reaches_target(
            initial in 0u32..5_000_000,
            rate_bp in 0u32..2000,
            years in 1u32..40,
            target in 1_000_000u32..100_000_000
        ) {
            let rate = rate_bp as f64 / 10_000.0;
            let contribution = required_yearly_contribution(initial as f64, rate, years, target as f64);
            let acc = Reinvestment::new(initial as f64, contribution, rate).run(years);
            prop_assert!(acc.final_value + 1e-3 >= target as f64);
            if contribution > 0.0 {
                prop_assert!((acc.final_value - target as f64).abs() <= target as f64 * 1e-9);
            }
        }
    }
}
