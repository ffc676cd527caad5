//! Splits `<left-expr> <op> <number>` into its three parts.

use crate::{EngineError, ResultEngine};

use super::{Operator, RuleComponents};

/// Detection order matters: `<=`/`>=` before the bare forms, `==` before `=`.
const OPERATORS: [(&str, Operator); 6] = [
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("<", Operator::Lt),
    (">", Operator::Gt),
    ("==", Operator::Eq),
    ("=", Operator::Eq),
];

/// Splits an expanded rule on its first whitespace-delimited comparison.
pub fn split(expanded: &str) -> ResultEngine<RuleComponents> {
    if expanded.trim().is_empty() {
        return Err(EngineError::InvalidInput(
            "rule statement must not be empty".to_string(),
        ));
    }

    let (index, token, operator) = OPERATORS
        .iter()
        .find_map(|(token, operator)| {
            find_operator(expanded, token).map(|index| (index, *token, *operator))
        })
        .ok_or_else(|| {
            EngineError::MalformedRule(format!("unsupported rule format: {expanded}"))
        })?;

    let left_expression = expanded[..index].trim();
    let right = expanded[index + token.len()..].trim();

    if left_expression.is_empty() {
        return Err(EngineError::MalformedRule(format!(
            "missing left expression: {expanded}"
        )));
    }

    Ok(RuleComponents {
        left_expression: left_expression.to_string(),
        operator,
        threshold: parse_threshold(right)?,
    })
}

/// First occurrence of `token` with whitespace on both sides.
fn find_operator(input: &str, token: &str) -> Option<usize> {
    input.match_indices(token).map(|(index, _)| index).find(|&index| {
        let before = input[..index].chars().next_back();
        let after = input[index + token.len()..].chars().next();
        before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace)
    })
}

/// Accepts plain decimals (`100`, `-2`, `99.5`, `.5`, `5.`); no exponents or `inf`.
fn parse_threshold(raw: &str) -> ResultEngine<f64> {
    let malformed = || EngineError::MalformedRule(format!("threshold is not a number: `{raw}`"));

    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (units, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let well_formed = !(units.is_empty() && frac.is_empty())
        && units.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(malformed());
    }
    raw.parse::<f64>().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_each_operator() {
        let cases = [
            ("a <= 100", Operator::Le, 100.0),
            ("a >= 60", Operator::Ge, 60.0),
            ("a < 100", Operator::Lt, 100.0),
            ("a > 100", Operator::Gt, 100.0),
            ("a == 5", Operator::Eq, 5.0),
            ("a = 5.5", Operator::Eq, 5.5),
        ];
        for (input, operator, threshold) in cases {
            let components = split(input).unwrap();
            assert_eq!(components.left_expression, "a");
            assert_eq!(components.operator, operator, "{input}");
            assert_eq!(components.threshold, threshold);
        }
    }

    #[test]
    fn less_equal_is_never_split_on_bare_less() {
        let components = split("x.totalAmountSpent + y.totalAmountSpent <= 100").unwrap();
        assert_eq!(components.operator, Operator::Le);
        assert_eq!(
            components.left_expression,
            "x.totalAmountSpent + y.totalAmountSpent"
        );
    }

    #[test]
    fn accepts_any_whitespace_around_operator() {
        let components = split("a\t>=\t10").unwrap();
        assert_eq!(components.operator, Operator::Ge);
        assert_eq!(components.threshold, 10.0);
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = split("l1.totalAmountSpent INVALID 100").unwrap_err();
        assert!(matches!(err, EngineError::MalformedRule(_)));
        assert!(matches!(split("a<=100"), Err(EngineError::MalformedRule(_))));
    }

    #[test]
    fn rejects_non_numeric_threshold() {
        assert!(matches!(split("a <= b"), Err(EngineError::MalformedRule(_))));
        assert!(matches!(split("a <= 1e3"), Err(EngineError::MalformedRule(_))));
        assert!(matches!(split("a <= inf"), Err(EngineError::MalformedRule(_))));
        assert!(matches!(split("a <= 5 <= 6"), Err(EngineError::MalformedRule(_))));
        assert!(matches!(split(" <= 5"), Err(EngineError::MalformedRule(_))));
    }

    #[test]
    fn accepts_bare_dot_decimals() {
        assert_eq!(split("a <= .5").unwrap().threshold, 0.5);
        assert_eq!(split("a < -.25").unwrap().threshold, -0.25);
        assert_eq!(split("a >= 5.").unwrap().threshold, 5.0);
        assert!(matches!(split("a <= ."), Err(EngineError::MalformedRule(_))));
    }

    #[test]
    fn blank_statement_is_invalid_input() {
        assert!(matches!(split("   "), Err(EngineError::InvalidInput(_))));
    }
}
