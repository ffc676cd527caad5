//! The data a rule is evaluated against.
//!
//! The schema is closed: rules can only read the fields listed in the
//! `*_field` resolvers below. Tier codes (`l1`, `l2`, ...) are dynamic map
//! keys, so per-tier aggregates live in a map rather than in struct fields.

use std::collections::HashMap;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Root name of the per-tier aggregate map.
pub const PLAYER_LEVELS_ROOT: &str = "playerLevels";
/// Root name of the team-season totals.
pub const TEAM_ROOT: &str = "team";
/// Root name of the season limits.
pub const SEASON_ROOT: &str = "season";

/// Spend and head count of one player tier inside one team-season.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelAggregate {
    pub level_code: String,
    pub total_amount_spent: MoneyCents,
    pub total_player_count: i32,
    /// Cached next-bid ceiling, rewritten on every recomputation pass.
    pub next_player_budget: Option<MoneyCents>,
}

impl LevelAggregate {
    pub fn new(level_code: &str, total_amount_spent: MoneyCents, total_player_count: i32) -> Self {
        Self {
            level_code: level_code.to_string(),
            total_amount_spent,
            total_player_count,
            next_player_budget: None,
        }
    }
}

/// Running totals of a team inside a season.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TeamView {
    pub total_amount_spent: MoneyCents,
    pub total_rtm_used: i32,
    pub total_free_used: i32,
    pub total_player: i32,
}

/// Caps configured on a season.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeasonLimits {
    pub year: i32,
    pub budget_limit: MoneyCents,
    pub min_player_amount: MoneyCents,
    pub max_players_allowed: i32,
    pub max_rtm_allowed: i32,
    pub max_free_allowed: i32,
}

/// Read-only snapshot handed to the rule evaluator.
///
/// Built fresh for every recomputation pass and never persisted. A missing
/// `team`/`season` or a missing tier key reads as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationContext {
    pub team: Option<TeamView>,
    pub season: Option<SeasonLimits>,
    pub player_levels: HashMap<String, LevelAggregate>,
}

impl EvaluationContext {
    pub fn with_team(mut self, team: TeamView) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_season(mut self, season: SeasonLimits) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_level(mut self, level: LevelAggregate) -> Self {
        self.player_levels.insert(level.level_code.clone(), level);
        self
    }

    /// Resolves `root.field` for the record roots (`team`, `season`).
    pub(crate) fn field(&self, root: &str, field: &str) -> ResultEngine<f64> {
        match root {
            TEAM_ROOT => team_field(self.team.as_ref(), field),
            SEASON_ROOT => season_field(self.season.as_ref(), field),
            PLAYER_LEVELS_ROOT => Err(EngineError::MalformedRule(format!(
                "`{root}` is a map and needs an indexed key before `.{field}`"
            ))),
            other => Err(unknown_root(other)),
        }
    }

    /// Resolves `root[key].field` for the map roots (`playerLevels`).
    pub(crate) fn lookup(&self, root: &str, key: &str, field: &str) -> ResultEngine<f64> {
        match root {
            PLAYER_LEVELS_ROOT => level_field(self.player_levels.get(key), field),
            TEAM_ROOT | SEASON_ROOT => Err(EngineError::MalformedRule(format!(
                "`{root}` is not a map and cannot be indexed"
            ))),
            other => Err(unknown_root(other)),
        }
    }
}

fn unknown_root(root: &str) -> EngineError {
    EngineError::MalformedRule(format!("unknown root `{root}`"))
}

fn unknown_field(root: &str, field: &str) -> EngineError {
    EngineError::MalformedRule(format!("unknown field `{field}` on `{root}`"))
}

fn level_field(level: Option<&LevelAggregate>, field: &str) -> ResultEngine<f64> {
    let value = match field {
        "totalAmountSpent" => level.map(|l| l.total_amount_spent.as_f64()),
        "totalPlayerCount" => level.map(|l| f64::from(l.total_player_count)),
        "nextPlayerBudget" => level.and_then(|l| l.next_player_budget.map(MoneyCents::as_f64)),
        other => return Err(unknown_field(PLAYER_LEVELS_ROOT, other)),
    };
    Ok(value.unwrap_or(0.0))
}

fn team_field(team: Option<&TeamView>, field: &str) -> ResultEngine<f64> {
    let value = match field {
        "totalAmountSpent" => team.map(|t| t.total_amount_spent.as_f64()),
        "totalRtmUsed" => team.map(|t| f64::from(t.total_rtm_used)),
        "totalFreeUsed" => team.map(|t| f64::from(t.total_free_used)),
        "totalPlayer" => team.map(|t| f64::from(t.total_player)),
        other => return Err(unknown_field(TEAM_ROOT, other)),
    };
    Ok(value.unwrap_or(0.0))
}

fn season_field(season: Option<&SeasonLimits>, field: &str) -> ResultEngine<f64> {
    let value = match field {
        "year" => season.map(|s| f64::from(s.year)),
        "budgetLimit" => season.map(|s| s.budget_limit.as_f64()),
        "minPlayerAmount" => season.map(|s| s.min_player_amount.as_f64()),
        "maxPlayersAllowed" => season.map(|s| f64::from(s.max_players_allowed)),
        "maxRtmAllowed" => season.map(|s| f64::from(s.max_rtm_allowed)),
        "maxFreeAllowed" => season.map(|s| f64::from(s.max_free_allowed)),
        other => return Err(unknown_field(SEASON_ROOT, other)),
    };
    Ok(value.unwrap_or(0.0))
}
