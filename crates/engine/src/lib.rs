//! Budget rules and roster bookkeeping for a player auction.
//!
//! The [`rule_engine`] turns authored rule statements into a remaining
//! allowance; [`Engine`] keeps rosters, per-tier aggregates and next-bid
//! ceilings in the database consistent with each other.

pub use context::{EvaluationContext, LevelAggregate, SeasonLimits, TeamView};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, RuleScope, next_bid_ceilings};
pub use roster::RosterRequest;
pub use rule::Rule;
pub use rule_engine::{
    COMMON_CATEGORY, CompiledRule, NEXT_BID_BUDGET, Operator, RuleComponents, evaluate_rule,
};

mod context;
mod error;
mod money;
mod ops;
pub mod rule_engine;

pub mod level_aggregates;
pub mod player_levels;
pub mod players;
pub mod roster;
pub mod rule;
pub mod seasons;
pub mod team_seasons;
pub mod teams;

type ResultEngine<T> = Result<T, EngineError>;
