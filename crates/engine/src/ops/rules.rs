use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{CompiledRule, EvaluationContext, ResultEngine, Rule, evaluate_rule, rule};

use super::{Engine, normalize_required_code, with_tx};

impl Engine {
    /// Every stored rule, active or not, ordered by season and priority.
    pub async fn all_rules(&self) -> ResultEngine<Vec<Rule>> {
        with_tx!(self, |db_tx| {
            let models = rule::Entity::find()
                .order_by_asc(rule::Column::SeasonId)
                .order_by_asc(rule::Column::Priority)
                .order_by_asc(rule::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Rule::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Insert a rule, or replace the stored one with the same id.
    ///
    /// The statement must compile: a rule that could never be evaluated is
    /// refused here rather than skipped on every recomputation.
    pub async fn save_rule(&self, mut rule: Rule) -> ResultEngine<Uuid> {
        rule.context = normalize_required_code(&rule.context, "rule context")?;
        CompiledRule::compile(&rule)?;

        with_tx!(self, |db_tx| {
            self.require_season(&db_tx, rule.season_id).await?;

            let model = rule::ActiveModel::try_from(&rule)?;
            let exists = rule::Entity::find_by_id(rule.id)
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                model.update(&db_tx).await?;
            } else {
                model.insert(&db_tx).await?;
            }
            tracing::debug!(rule_id = %rule.id, season_id = %rule.season_id, "rule saved");
            Ok(rule.id)
        })
    }

    /// Active rules of `season_id` tagged `context`, by ascending priority
    /// then creation time.
    pub async fn rules_by_season_and_context(
        &self,
        season_id: Uuid,
        context: &str,
    ) -> ResultEngine<Vec<Rule>> {
        let context = normalize_required_code(context, "rule context")?;
        with_tx!(self, |db_tx| {
            let models = active_rule_models(&db_tx, season_id, &context).await?;
            models
                .into_iter()
                .map(Rule::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Evaluates the active rules of `season_id` tagged `context` against
    /// `data`, one remaining value per rule in query order. The first failing
    /// rule aborts the whole call.
    pub async fn evaluate_rules(
        &self,
        season_id: Uuid,
        context: &str,
        data: &EvaluationContext,
    ) -> ResultEngine<Vec<f64>> {
        let rules = self.rules_by_season_and_context(season_id, context).await?;
        rules.iter().map(|rule| evaluate_rule(data, rule)).collect()
    }
}

/// Rows come back undecoded; the recomputation pass skips one that fails to
/// decode.
pub(super) async fn active_rule_models(
    db: &DatabaseTransaction,
    season_id: Uuid,
    context: &str,
) -> ResultEngine<Vec<rule::Model>> {
    rule::Entity::find()
        .filter(rule::Column::SeasonId.eq(season_id))
        .filter(rule::Column::Context.eq(context))
        .filter(rule::Column::IsActive.eq(true))
        .order_by_asc(rule::Column::Priority)
        .order_by_asc(rule::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
