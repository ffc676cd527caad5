//! Dotted map access to indexed map access.
//!
//! Before: `playerLevels.l1.totalAmountSpent`
//!
//! After: `playerLevels[l1].totalAmountSpent`

use regex::{Captures, Regex};

use crate::{EngineError, ResultEngine, context::PLAYER_LEVELS_ROOT};

/// Rewrites `R.<key>.` to `R[<key>].` for every declared map root `R`.
///
/// Only the first segment after the root becomes a key; deeper segments stay
/// field accesses. With no declared roots, `playerLevels` is rewritten.
pub fn rewrite(expression: &str, map_roots: &[String]) -> ResultEngine<String> {
    let defaults = [PLAYER_LEVELS_ROOT.to_string()];
    let roots = if map_roots.is_empty() {
        &defaults[..]
    } else {
        map_roots
    };

    let mut result = expression.to_string();
    for root in roots.iter().map(|root| root.trim()).filter(|root| !root.is_empty()) {
        let regex = Regex::new(&format!(r"\b{}\.([a-zA-Z0-9]+)\.", regex::escape(root)))
            .map_err(|err| {
                EngineError::MalformedRule(format!("invalid map root `{root}`: {err}"))
            })?;
        result = regex
            .replace_all(&result, |caps: &Captures<'_>| format!("{root}[{}].", &caps[1]))
            .into_owned();
    }
    Ok(result)
}
