//! Remaining allowance under a rule threshold.

use super::Operator;

/// Step applied to strict comparisons so the *next* increment stays in bounds.
const STRICT_STEP: f64 = 0.01;

/// Threshold after the operator-specific adjustment.
///
/// `<` tightens by one cent, `>` loosens by one cent, the rest are unchanged.
pub fn adjusted_threshold(threshold: f64, operator: Operator) -> f64 {
    match operator {
        Operator::Lt => threshold - STRICT_STEP,
        Operator::Gt => threshold + STRICT_STEP,
        Operator::Le | Operator::Ge | Operator::Eq => threshold,
    }
}

/// Rounds to two decimals, halves going up.
///
/// The scaled value is nudged by a relative epsilon first so that inputs
/// like `1.005` (stored as `1.00499...`) still round to `1.01`.
pub fn round_half_up(value: f64) -> f64 {
    let scaled = value * 100.0;
    let nudged = scaled + scaled.abs() * 1e-12;
    (nudged + 0.5).floor() / 100.0
}

/// `max(0, round_half_up(adjusted_threshold - current_total))`.
///
/// Rounding happens once, after the subtraction. Never negative: zero means
/// no further spend is permitted.
pub fn remaining(threshold: f64, operator: Operator, current_total: f64) -> f64 {
    let rounded = round_half_up(adjusted_threshold(threshold, operator) - current_total);
    if rounded > 0.0 { rounded } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operator; 5] = [
        Operator::Le,
        Operator::Ge,
        Operator::Lt,
        Operator::Gt,
        Operator::Eq,
    ];

    #[test]
    fn strict_operators_shift_by_a_cent() {
        for threshold in [0.0, 1.0, 100.0, 2500.5, -3.0] {
            assert_eq!(adjusted_threshold(threshold, Operator::Lt), threshold - 0.01);
            assert_eq!(adjusted_threshold(threshold, Operator::Gt), threshold + 0.01);
            for operator in [Operator::Le, Operator::Ge, Operator::Eq] {
                assert_eq!(adjusted_threshold(threshold, operator), threshold);
            }
        }
    }

    #[test]
    fn remaining_matches_reference_scenarios() {
        assert_eq!(remaining(100.0, Operator::Le, 56.0), 44.0);
        assert_eq!(remaining(100.0, Operator::Lt, 56.0), 43.99);
        assert_eq!(remaining(100.0, Operator::Gt, 56.0), 44.01);
        assert_eq!(remaining(60.0, Operator::Ge, 50.0), 10.0);
        assert_eq!(remaining(100.0, Operator::Le, 0.0), 100.0);
    }

    #[test]
    fn remaining_is_never_negative() {
        for operator in ALL {
            for current in [0.0, 0.004, 99.99, 100.0, 100.01, 1e6] {
                let value = remaining(100.0, operator, current);
                assert!(value >= 0.0, "{operator:?} {current} -> {value}");
                assert!(value.is_sign_positive());
            }
        }
        assert_eq!(remaining(50.0, Operator::Le, 80.0), 0.0);
    }

    #[test]
    fn rounds_half_up_once() {
        assert_eq!(round_half_up(1.005), 1.01);
        assert_eq!(round_half_up(2.675), 2.68);
        assert_eq!(round_half_up(0.004), 0.0);
        assert_eq!(round_half_up(43.989_999_999_999_995), 43.99);
        assert_eq!(remaining(10.0, Operator::Le, 3.333), 6.67);
    }
}
