//! Shorthand expansion.
//!
//! Before: `l1.totalAmountSpent + l2.totalAmountSpent <= 100`
//! with `{"l": "playerLevels.l"}`.
//!
//! After: `playerLevels.l1.totalAmountSpent + playerLevels.l2.totalAmountSpent <= 100`.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::{EngineError, ResultEngine};

/// Rewrites every `<pattern><digits>.` token to its fully qualified path.
///
/// The replacement minus a trailing `pattern` is the prefix put in front of
/// the token: `"playerLevels.l"` and `"playerLevels."` both turn `l1.` into
/// `playerLevels.l1.`. Entries with a blank pattern or replacement are
/// skipped. A token already preceded by `.` or by its prefix is left alone,
/// so expanding twice changes nothing.
pub fn expand(input: &str, notation_map: &BTreeMap<String, String>) -> ResultEngine<String> {
    let mut result = input.to_string();
    for (pattern, replacement) in notation_map {
        let pattern = pattern.trim();
        let replacement = replacement.trim();
        if pattern.is_empty() || replacement.is_empty() {
            continue;
        }

        let regex = Regex::new(&format!(r"\b({}\d+)\.", regex::escape(pattern))).map_err(
            |err| EngineError::MalformedRule(format!("invalid notation `{pattern}`: {err}")),
        )?;

        let prefix = replacement.strip_suffix(pattern).unwrap_or(replacement);
        let source = result;
        result = regex
            .replace_all(&source, |caps: &Captures<'_>| {
                let start = caps.get(0).map_or(0, |m| m.start());
                let before = &source[..start];
                if before.ends_with('.') || before.ends_with(prefix) {
                    return caps[0].to_string();
                }
                format!("{prefix}{}.", &caps[1])
            })
            .into_owned();
    }
    Ok(result)
}
