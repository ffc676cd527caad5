//! The budget rule language.
//!
//! A rule goes through four passes before it yields a number:
//!
//! 1. [`expand`] rewrites shorthand (`l1.`) to context paths
//!    (`playerLevels.l1.`);
//! 2. [`split`] cuts the statement into left expression, operator and
//!    threshold;
//! 3. [`rewrite`] turns map paths into indexed lookups
//!    (`playerLevels[l1].`);
//! 4. the left expression is parsed and evaluated against an
//!    [`EvaluationContext`], and [`remaining`] turns the total into the
//!    allowance left under the threshold.

use std::collections::BTreeSet;

use crate::{EngineError, EvaluationContext, ResultEngine, Rule};

mod budget;
mod expr;
mod notation;
mod paths;
mod splitter;

pub use budget::{adjusted_threshold, remaining, round_half_up};
pub use expr::evaluate;
pub use notation::expand;
pub use paths::rewrite;
pub use splitter::split;

use expr::Expr;

/// Context tag of the rules that drive next-bid ceilings.
pub const NEXT_BID_BUDGET: &str = "next_bid_budget";

/// Category marking a rule as applying to every tier.
pub const COMMON_CATEGORY: &str = "common";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Le,
    Ge,
    Lt,
    Gt,
    /// Both `==` and `=`.
    Eq,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Eq => "==",
        }
    }
}

/// A statement cut at its comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleComponents {
    pub left_expression: String,
    pub operator: Operator,
    pub threshold: f64,
}

/// A rule that went through every textual pass and parsed.
///
/// Compiling once lets the recomputation pass reuse the expression for
/// evaluation and for deciding which tiers the rule touches.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    components: RuleComponents,
    expression: Expr,
}

impl CompiledRule {
    pub fn compile(rule: &Rule) -> ResultEngine<Self> {
        if rule.rule_statement.trim().is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "rule {} has an empty statement",
                rule.id
            )));
        }

        let expanded = expand(&rule.rule_statement, &rule.notation_map)?;
        let mut components = split(&expanded)?;
        components.left_expression = rewrite(&components.left_expression, &rule.map_names)?;
        let expression = Expr::parse(&components.left_expression)?;

        Ok(Self {
            components,
            expression,
        })
    }

    pub fn components(&self) -> &RuleComponents {
        &self.components
    }

    /// Tier codes the left expression reads.
    pub fn referenced_levels(&self) -> BTreeSet<String> {
        self.expression.referenced_keys()
    }

    /// Current total of the left expression.
    pub fn current_total(&self, context: &EvaluationContext) -> ResultEngine<f64> {
        self.expression.evaluate(context)
    }

    /// Allowance left under the threshold, never negative.
    pub fn remaining(&self, context: &EvaluationContext) -> ResultEngine<f64> {
        let current_total = self.current_total(context)?;
        Ok(remaining(
            self.components.threshold,
            self.components.operator,
            current_total,
        ))
    }
}

/// Evaluates one rule and returns the remaining allowance.
///
/// Inactive rules are refused.
pub fn evaluate_rule(context: &EvaluationContext, rule: &Rule) -> ResultEngine<f64> {
    if !rule.is_active {
        return Err(EngineError::InvalidInput(format!(
            "rule {} is inactive",
            rule.id
        )));
    }
    let compiled = CompiledRule::compile(rule)?;
    let value = compiled.remaining(context)?;
    tracing::debug!(
        rule_id = %rule.id,
        expression = %compiled.components.left_expression,
        operator = compiled.components.operator.symbol(),
        threshold = compiled.components.threshold,
        remaining = value,
        "rule evaluated"
    );
    Ok(value)
}
