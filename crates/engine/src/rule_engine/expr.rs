//! Arithmetic over the evaluation context.
//!
//! Grammar (after path rewriting):
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := '-' unary | '+' unary | primary
//! primary := number | '(' sum ')' | path
//! path    := ident '[' key ']' '.' ident     map lookup
//!          | ident '.' ident                 record field
//! ```

use std::collections::BTreeSet;

use crate::{EngineError, EvaluationContext, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Literal(f64),
    /// `root[key].field`
    Lookup {
        root: String,
        key: String,
        field: String,
    },
    /// `root.field`
    Field { root: String, field: String },
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub(crate) fn parse(input: &str) -> ResultEngine<Expr> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.sum()?;
        if let Some(token) = parser.peek() {
            return Err(parser.malformed(&format!("unexpected {token:?}")));
        }
        Ok(expr)
    }

    pub(crate) fn evaluate(&self, context: &EvaluationContext) -> ResultEngine<f64> {
        match self {
            Expr::Literal(value) => Ok(*value),
            Expr::Lookup { root, key, field } => context.lookup(root, key, field),
            Expr::Field { root, field } => context.field(root, field),
            Expr::Neg(inner) => Ok(-inner.evaluate(context)?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                let value = match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => {
                        if rhs == 0.0 {
                            return Err(EngineError::Evaluation("division by zero".to_string()));
                        }
                        lhs / rhs
                    }
                };
                if !value.is_finite() {
                    return Err(EngineError::Evaluation(format!(
                        "arithmetic overflow in {op:?}"
                    )));
                }
                Ok(value)
            }
        }
    }

    /// Map keys the expression reads, e.g. `{"l1", "l2"}`.
    pub(crate) fn referenced_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys(&self, keys: &mut BTreeSet<String>) {
        match self {
            Expr::Lookup { key, .. } => {
                keys.insert(key.clone());
            }
            Expr::Neg(inner) => inner.collect_keys(keys),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_keys(keys);
                rhs.collect_keys(keys);
            }
            Expr::Literal(_) | Expr::Field { .. } => {}
        }
    }
}

/// Parses and evaluates `expr` in one go.
pub fn evaluate(expr: &str, context: &EvaluationContext) -> ResultEngine<f64> {
    Expr::parse(expr)?.evaluate(context)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Key(String),
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> ResultEngine<Vec<Token>> {
    let malformed = |msg: String| EngineError::MalformedRule(format!("{msg} in `{input}`"));

    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                let mut end = start;
                let mut seen_dot = false;
                while let Some(&(i, c)) = chars.peek() {
                    let fraction_dot = c == '.'
                        && !seen_dot
                        && input[i + 1..].starts_with(|n: char| n.is_ascii_digit());
                    if !(c.is_ascii_digit() || fraction_dot) {
                        break;
                    }
                    seen_dot |= c == '.';
                    end = i + c.len_utf8();
                    chars.next();
                }
                let literal = &input[start..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("invalid number `{literal}`")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            '[' => {
                chars.next();
                let rest = &input[start + 1..];
                let close = rest
                    .find(']')
                    .ok_or_else(|| malformed("unclosed `[`".to_string()))?;
                let key = rest[..close].trim().trim_matches(|c| c == '\'' || c == '"');
                if key.is_empty() {
                    return Err(malformed("empty map key".to_string()));
                }
                tokens.push(Token::Key(key.to_string()));
                while chars.next_if(|&(i, _)| i <= start + 1 + close).is_some() {}
            }
            _ => {
                let token = match ch {
                    '.' => Token::Dot,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(malformed(format!("unexpected character `{other}`"))),
                };
                tokens.push(token);
                chars.next();
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn malformed(&self, msg: &str) -> EngineError {
        EngineError::MalformedRule(format!("{msg} in `{}`", self.input))
    }

    fn sum(&mut self) -> ResultEngine<Expr> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn product(&mut self) -> ResultEngine<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> ResultEngine<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> ResultEngine<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Literal(value)),
            Some(Token::LParen) => {
                let inner = self.sum()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.malformed("missing `)`"));
                }
                Ok(inner)
            }
            Some(Token::Ident(root)) => self.path(root),
            Some(other) => Err(self.malformed(&format!("unexpected {other:?}"))),
            None => Err(self.malformed("unexpected end of expression")),
        }
    }

    fn path(&mut self, root: String) -> ResultEngine<Expr> {
        let key = match self.peek() {
            Some(Token::Key(key)) => {
                let key = key.clone();
                self.pos += 1;
                Some(key)
            }
            _ => None,
        };

        let mut segments = Vec::new();
        while self.eat(&Token::Dot) {
            match self.advance() {
                Some(Token::Ident(segment)) => segments.push(segment),
                _ => return Err(self.malformed(&format!("expected a field name after `{root}.`"))),
            }
        }

        // Records are flat: exactly one field after the root (or the key).
        let field = match <[String; 1]>::try_from(segments) {
            Ok([field]) => field,
            Err(segments) if segments.is_empty() => {
                return Err(self.malformed(&format!("`{root}` needs a field")));
            }
            Err(_) => {
                return Err(self.malformed(&format!("`{root}` path is too deep")));
            }
        };

        Ok(match key {
            Some(key) => Expr::Lookup { root, key, field },
            None => Expr::Field { root, field },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LevelAggregate, MoneyCents, SeasonLimits, TeamView};

    fn context() -> EvaluationContext {
        EvaluationContext::default()
            .with_level(LevelAggregate::new("l1", MoneyCents::new(3500), 3))
            .with_level(LevelAggregate::new("l2", MoneyCents::new(2100), 2))
            .with_team(TeamView {
                total_amount_spent: MoneyCents::new(5600),
                total_rtm_used: 1,
                total_free_used: 0,
                total_player: 5,
            })
            .with_season(SeasonLimits {
                budget_limit: MoneyCents::new(10_000),
                max_players_allowed: 11,
                ..SeasonLimits::default()
            })
    }

    #[test]
    fn sums_map_lookups() {
        let value = evaluate(
            "playerLevels[l1].totalAmountSpent + playerLevels[l2].totalAmountSpent",
            &context(),
        )
        .unwrap();
        assert_eq!(value, 56.0);
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(evaluate("2 + 3 * 4", &context()).unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4", &context()).unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3", &context()).unwrap(), 3.0);
        assert_eq!(evaluate("12 / 3 / 2", &context()).unwrap(), 2.0);
        assert_eq!(evaluate("-2.5 * -2", &context()).unwrap(), 5.0);
    }

    #[test]
    fn reads_team_and_season_fields() {
        let value = evaluate(
            "season.maxPlayersAllowed - team.totalPlayer + team.totalRtmUsed",
            &context(),
        )
        .unwrap();
        assert_eq!(value, 7.0);
        assert_eq!(evaluate("season.budgetLimit", &context()).unwrap(), 100.0);
    }

    #[test]
    fn quoted_keys_are_accepted() {
        let value = evaluate("playerLevels['l2'].totalPlayerCount", &context()).unwrap();
        assert_eq!(value, 2.0);
    }

    #[test]
    fn missing_tier_is_zero() {
        let value = evaluate("playerLevels[l7].totalAmountSpent + 1", &context()).unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn commutative_order_gives_same_result() {
        let ctx = context();
        let a = evaluate(
            "playerLevels[l1].totalAmountSpent + playerLevels[l2].totalAmountSpent + 0.1",
            &ctx,
        )
        .unwrap();
        let b = evaluate(
            "0.1 + playerLevels[l2].totalAmountSpent + playerLevels[l1].totalAmountSpent",
            &ctx,
        )
        .unwrap();
        let c = evaluate("playerLevels[l2].totalPlayerCount * team.totalPlayer", &ctx).unwrap();
        let d = evaluate("team.totalPlayer * playerLevels[l2].totalPlayerCount", &ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(c, d);
    }

    #[test]
    fn division_by_zero_fails() {
        let err = evaluate(
            "playerLevels[l1].totalAmountSpent / playerLevels[l9].totalPlayerCount",
            &context(),
        )
        .unwrap_err();
        assert_eq!(err, EngineError::Evaluation("division by zero".to_string()));
    }

    #[test]
    fn rejects_bad_syntax() {
        for input in [
            "",
            "1 +",
            "(1 + 2",
            "1 2",
            "playerLevels[l1]",
            "playerLevels[].totalAmountSpent",
            "playerLevels[l1.totalAmountSpent",
            "team.totalPlayer.count",
            "team",
            "1 % 2",
        ] {
            assert!(
                matches!(evaluate(input, &context()), Err(EngineError::MalformedRule(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn unrewritten_map_path_is_rejected() {
        let err = evaluate("playerLevels.l1.totalAmountSpent", &context()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedRule(_)));
    }

    #[test]
    fn collects_referenced_keys() {
        let expr = Expr::parse(
            "(playerLevels[l1].totalAmountSpent + playerLevels[l3].totalPlayerCount) * team.totalPlayer",
        )
        .unwrap();
        let keys: Vec<_> = expr.referenced_keys().into_iter().collect();
        assert_eq!(keys, vec!["l1".to_string(), "l3".to_string()]);
    }
}
