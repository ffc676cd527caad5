//! Recomputation of a team-season's aggregates and next-bid ceilings.
//!
//! Every roster mutation ends with a pass over the affected team-seasons.
//! The roster is read once, per-tier aggregates and team totals are rebuilt
//! from it, and the season's `next_bid_budget` rules turn the fresh numbers
//! into a ceiling per tier.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    COMMON_CATEGORY, CompiledRule, EngineError, EvaluationContext, LevelAggregate, MoneyCents,
    NEXT_BID_BUDGET, ResultEngine, Rule, SeasonLimits, TeamView, level_aggregates, player_levels,
    players, roster, team_seasons,
};

use super::{Engine, rules::active_rule_models, with_tx};

/// Which tiers a rule's ceiling applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleScope {
    /// Every tier.
    Common,
    /// Only the listed tier codes.
    Levels(BTreeSet<String>),
}

impl RuleScope {
    /// A rule is common when its category says so or when it reads no tier;
    /// otherwise it is scoped to exactly the tiers it reads.
    pub fn of(rule: &Rule, compiled: &CompiledRule) -> Self {
        let is_common = rule
            .rule_category
            .as_deref()
            .is_some_and(|category| category.trim().eq_ignore_ascii_case(COMMON_CATEGORY));
        let levels = compiled.referenced_levels();
        if is_common || levels.is_empty() {
            Self::Common
        } else {
            Self::Levels(levels)
        }
    }

    pub fn applies_to(&self, level_code: &str) -> bool {
        match self {
            Self::Common => true,
            Self::Levels(levels) => levels.contains(level_code),
        }
    }
}

/// Next-bid ceiling per tier code.
///
/// Each ceiling is the minimum of `budget_limit` and every evaluated rule
/// whose scope covers the tier. Rule values are already clamped at zero.
pub fn next_bid_ceilings(
    budget_limit: f64,
    level_codes: &[String],
    evaluated: &[(RuleScope, f64)],
) -> BTreeMap<String, f64> {
    level_codes
        .iter()
        .map(|code| {
            let ceiling = evaluated
                .iter()
                .filter(|(scope, _)| scope.applies_to(code))
                .map(|(_, remaining)| *remaining)
                .fold(budget_limit, f64::min);
            (code.clone(), ceiling)
        })
        .collect()
}

/// One roster entry reduced to what the totals need.
#[derive(Clone, Copy, Debug)]
struct RosterLine {
    player_level_id: Uuid,
    sold_amount: MoneyCents,
    is_free: bool,
    is_rtm_used: bool,
}

#[derive(Debug, Default, PartialEq)]
struct RosterTotals {
    /// Spend and head count per tier id.
    per_level: HashMap<Uuid, (MoneyCents, i32)>,
    team: TeamView,
}

impl RosterTotals {
    fn from_lines(lines: &[RosterLine]) -> Self {
        let mut totals = Self::default();
        for line in lines {
            let level = totals
                .per_level
                .entry(line.player_level_id)
                .or_insert((MoneyCents::ZERO, 0));
            level.0 += line.sold_amount;
            level.1 += 1;

            totals.team.total_amount_spent += line.sold_amount;
            totals.team.total_player += 1;
            if line.is_free {
                totals.team.total_free_used += 1;
            }
            if line.is_rtm_used {
                totals.team.total_rtm_used += 1;
            }
        }
        totals
    }

    fn level(&self, player_level_id: Uuid) -> (MoneyCents, i32) {
        self.per_level
            .get(&player_level_id)
            .copied()
            .unwrap_or((MoneyCents::ZERO, 0))
    }
}

impl Engine {
    /// Rebuild aggregates, team totals and next-bid ceilings of a
    /// team-season from its roster.
    pub async fn recompute_team_season(
        &self,
        team_season_id: Uuid,
    ) -> ResultEngine<Vec<LevelAggregate>> {
        with_tx!(self, |db_tx| self.recompute_in_tx(&db_tx, team_season_id).await)
    }

    /// Cached per-tier aggregates, ordered by tier code.
    pub async fn level_aggregates(
        &self,
        team_season_id: Uuid,
    ) -> ResultEngine<Vec<LevelAggregate>> {
        with_tx!(self, |db_tx| {
            self.require_team_season(&db_tx, team_season_id).await?;
            stored_aggregates(&db_tx, team_season_id).await
        })
    }

    /// The context rules see for a team-season, built from persisted state.
    pub async fn evaluation_context(
        &self,
        team_season_id: Uuid,
    ) -> ResultEngine<EvaluationContext> {
        with_tx!(self, |db_tx| {
            let team_season = self.require_team_season(&db_tx, team_season_id).await?;
            let season = self.require_season(&db_tx, team_season.season_id).await?;
            let context = stored_aggregates(&db_tx, team_season_id)
                .await?
                .into_iter()
                .fold(
                    EvaluationContext::default()
                        .with_team(TeamView::from(&team_season))
                        .with_season(SeasonLimits::from(&season)),
                    EvaluationContext::with_level,
                );
            Ok(context)
        })
    }

    pub(super) async fn recompute_in_tx(
        &self,
        db: &DatabaseTransaction,
        team_season_id: Uuid,
    ) -> ResultEngine<Vec<LevelAggregate>> {
        let team_season = self.require_team_season(db, team_season_id).await?;
        let season = self.require_season(db, team_season.season_id).await?;
        let levels = player_levels::Entity::find()
            .order_by_asc(player_levels::Column::Code)
            .all(db)
            .await?;

        let entries = roster::Entity::find()
            .filter(roster::Column::TeamSeasonId.eq(team_season_id))
            .find_also_related(players::Entity)
            .all(db)
            .await?;
        let lines = entries
            .into_iter()
            .map(|(entry, player)| {
                let player = player.ok_or_else(|| {
                    EngineError::KeyNotFound(format!("player of roster entry {}", entry.code))
                })?;
                Ok(RosterLine {
                    player_level_id: player.player_level_id,
                    sold_amount: MoneyCents::new(entry.sold_amount.unwrap_or(0)),
                    is_free: entry.is_free,
                    is_rtm_used: entry.is_rtm_used,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        let totals = RosterTotals::from_lines(&lines);

        let team_model = team_seasons::ActiveModel {
            id: ActiveValue::Set(team_season.id),
            total_amount_spent: ActiveValue::Set(totals.team.total_amount_spent.cents()),
            total_rtm_used: ActiveValue::Set(totals.team.total_rtm_used),
            total_free_used: ActiveValue::Set(totals.team.total_free_used),
            total_player: ActiveValue::Set(totals.team.total_player),
            ..Default::default()
        };
        team_model.update(db).await?;

        let existing: HashMap<Uuid, level_aggregates::Model> = level_aggregates::Entity::find()
            .filter(level_aggregates::Column::TeamSeasonId.eq(team_season_id))
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.player_level_id, model))
            .collect();

        let limits = SeasonLimits::from(&season);
        let mut context = EvaluationContext::default()
            .with_team(totals.team)
            .with_season(limits);
        for level in &levels {
            let (spent, count) = totals.level(level.id);
            let mut aggregate = LevelAggregate::new(&level.code, spent, count);
            aggregate.next_player_budget = existing
                .get(&level.id)
                .and_then(|model| model.next_player_budget)
                .map(MoneyCents::new);
            context = context.with_level(aggregate);
        }

        let level_codes: Vec<String> = levels.iter().map(|level| level.code.clone()).collect();
        let evaluated = evaluate_scoped(db, season.id, &context).await?;
        let ceilings = next_bid_ceilings(limits.budget_limit.as_f64(), &level_codes, &evaluated);

        let now = Utc::now();
        let mut result = Vec::with_capacity(levels.len());
        for level in &levels {
            let (spent, count) = totals.level(level.id);
            let ceiling = ceilings
                .get(&level.code)
                .copied()
                .map(MoneyCents::from_f64)
                .unwrap_or(limits.budget_limit);

            let mut model = level_aggregates::ActiveModel {
                team_season_id: ActiveValue::Set(team_season_id),
                player_level_id: ActiveValue::Set(level.id),
                total_amount_spent: ActiveValue::Set(spent.cents()),
                total_player_count: ActiveValue::Set(count),
                next_player_budget: ActiveValue::Set(Some(ceiling.cents())),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            match existing.get(&level.id) {
                Some(row) => {
                    model.id = ActiveValue::Set(row.id);
                    model.update(db).await?;
                }
                None => {
                    model.id = ActiveValue::Set(Uuid::new_v4());
                    model.insert(db).await?;
                }
            }

            let mut aggregate = LevelAggregate::new(&level.code, spent, count);
            aggregate.next_player_budget = Some(ceiling);
            result.push(aggregate);
        }

        tracing::info!(
            team_season = %team_season.code,
            players = totals.team.total_player,
            spent = %totals.team.total_amount_spent,
            rules = evaluated.len(),
            "team season recomputed"
        );
        Ok(result)
    }
}

/// Evaluates the season's next-bid rules, skipping any that fail.
async fn evaluate_scoped(
    db: &DatabaseTransaction,
    season_id: Uuid,
    context: &EvaluationContext,
) -> ResultEngine<Vec<(RuleScope, f64)>> {
    let models = active_rule_models(db, season_id, NEXT_BID_BUDGET).await?;

    let mut evaluated = Vec::with_capacity(models.len());
    for model in models {
        let rule_id = model.id;
        let outcome = Rule::try_from(model).and_then(|rule| {
            let compiled = CompiledRule::compile(&rule)?;
            let remaining = compiled.remaining(context)?;
            Ok((RuleScope::of(&rule, &compiled), remaining))
        });
        match outcome {
            Ok((scope, remaining)) => {
                tracing::debug!(%rule_id, ?scope, remaining, "next bid rule evaluated");
                evaluated.push((scope, remaining));
            }
            Err(err) => {
                tracing::warn!(%rule_id, error = %err, "skipping next bid rule");
            }
        }
    }
    Ok(evaluated)
}

async fn stored_aggregates(
    db: &DatabaseTransaction,
    team_season_id: Uuid,
) -> ResultEngine<Vec<LevelAggregate>> {
    let rows = level_aggregates::Entity::find()
        .filter(level_aggregates::Column::TeamSeasonId.eq(team_season_id))
        .find_also_related(player_levels::Entity)
        .all(db)
        .await?;
    let mut aggregates = rows
        .into_iter()
        .map(|(model, level)| {
            let level = level.ok_or_else(|| {
                EngineError::KeyNotFound(format!("player level {}", model.player_level_id))
            })?;
            Ok(LevelAggregate::from((model, level.code.as_str())))
        })
        .collect::<ResultEngine<Vec<_>>>()?;
    aggregates.sort_by(|a, b| a.level_code.cmp(&b.level_code));
    Ok(aggregates)
}
