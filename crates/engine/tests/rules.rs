use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};

use engine::{EngineError, EvaluationContext, NEXT_BID_BUDGET, RosterRequest, Rule, rule};
use uuid::Uuid;

mod common;

use common::{cents, fixture, level};

fn level_rule(season_id: Uuid, statement: &str) -> Rule {
    Rule::new(season_id, NEXT_BID_BUDGET, statement)
        .with_notation("l", "playerLevels.l")
        .with_map_name("playerLevels")
}

#[tokio::test]
async fn ceilings_take_the_tightest_applicable_rule() {
    let (fx, _db) = fixture().await;
    fx.engine
        .save_rule(
            Rule::new(fx.season_id, NEXT_BID_BUDGET, "team.totalAmountSpent <= 80")
                .with_category("common"),
        )
        .await
        .unwrap();
    fx.engine
        .save_rule(level_rule(
            fx.season_id,
            "l1.totalAmountSpent + l2.totalAmountSpent <= 50",
        ))
        .await
        .unwrap();

    fx.engine
        .save_roster_entry(RosterRequest::new("csk-2025", "p1", cents(3500)))
        .await
        .unwrap();
    fx.engine
        .save_roster_entry(RosterRequest::new("csk-2025", "p3", cents(1000)))
        .await
        .unwrap();

    let aggregates = fx.engine.level_aggregates(fx.csk).await.unwrap();
    // common: 80 - 45 = 35, l1/l2 rule: 50 - 45 = 5
    assert_eq!(level(&aggregates, "l1").next_player_budget, Some(cents(500)));
    assert_eq!(level(&aggregates, "l2").next_player_budget, Some(cents(500)));
    assert_eq!(level(&aggregates, "l3").next_player_budget, Some(cents(3500)));
}

#[tokio::test]
async fn exhausted_rule_gives_a_zero_ceiling() {
    let (fx, _db) = fixture().await;
    fx.engine
        .save_rule(level_rule(fx.season_id, "l1.totalAmountSpent < 30"))
        .await
        .unwrap();

    fx.engine
        .save_roster_entry(RosterRequest::new("csk-2025", "p1", cents(3500)))
        .await
        .unwrap();

    let aggregates = fx.engine.level_aggregates(fx.csk).await.unwrap();
    assert_eq!(level(&aggregates, "l1").next_player_budget, Some(cents(0)));
    assert_eq!(level(&aggregates, "l2").next_player_budget, Some(cents(10_000)));
}

#[tokio::test]
async fn rule_on_a_tier_without_players_leaves_other_tiers_alone() {
    let (fx, _db) = fixture().await;
    fx.engine
        .save_rule(level_rule(fx.season_id, "l9.totalAmountSpent <= 10"))
        .await
        .unwrap();

    let aggregates = fx.engine.recompute_team_season(fx.csk).await.unwrap();
    assert_eq!(aggregates.len(), 3);
    for aggregate in &aggregates {
        assert_eq!(aggregate.next_player_budget, Some(cents(10_000)));
    }
}

#[tokio::test]
async fn failing_rules_are_skipped_by_recomputation() {
    let (fx, db) = fixture().await;

    // stored without going through validation
    rule::ActiveModel {
        id: Set(Uuid::new_v4()),
        season_id: Set(fx.season_id),
        context: Set(NEXT_BID_BUDGET.to_string()),
        rule_category: Set(None),
        rule_name: Set(Some("broken".to_string())),
        rule_statement: Set("l1.totalAmountSpent INVALID 100".to_string()),
        notation_map: Set(Some(r#"{"l":"playerLevels.l"}"#.to_string())),
        map_names: Set(None),
        is_active: Set(true),
        priority: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap();
    fx.engine
        .save_rule(
            level_rule(fx.season_id, "l1.totalAmountSpent / l3.totalPlayerCount <= 5")
                .with_priority(1),
        )
        .await
        .unwrap();

    fx.engine
        .save_roster_entry(RosterRequest::new("csk-2025", "p1", cents(3500)))
        .await
        .unwrap();

    let aggregates = fx.engine.level_aggregates(fx.csk).await.unwrap();
    for aggregate in &aggregates {
        assert_eq!(aggregate.next_player_budget, Some(cents(10_000)));
    }

    // direct callers still see the error
    let context = fx.engine.evaluation_context(fx.csk).await.unwrap();
    let err = fx
        .engine
        .evaluate_rules(fx.season_id, NEXT_BID_BUDGET, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedRule(_)));
}

#[tokio::test]
async fn save_rule_validates_before_storing() {
    let (fx, _db) = fixture().await;

    let err = fx
        .engine
        .save_rule(level_rule(fx.season_id, "l1.totalAmountSpent INVALID 100"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedRule(_)));

    let err = fx
        .engine
        .save_rule(level_rule(fx.season_id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = fx
        .engine
        .save_rule(Rule::new(fx.season_id, " ", "team.totalPlayer <= 3"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = fx
        .engine
        .save_rule(level_rule(Uuid::new_v4(), "l1.totalAmountSpent <= 100"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert!(fx.engine.all_rules().await.unwrap().is_empty());
}

#[tokio::test]
async fn saving_an_existing_rule_replaces_it() {
    let (fx, _db) = fixture().await;
    let rule = level_rule(fx.season_id, "l1.totalAmountSpent <= 100").with_name("l1 cap");
    let id = fx.engine.save_rule(rule.clone()).await.unwrap();

    let mut edited = rule;
    edited.rule_statement = "l1.totalAmountSpent <= 60".to_string();
    assert_eq!(fx.engine.save_rule(edited).await.unwrap(), id);

    let rules = fx.engine.all_rules().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule_statement, "l1.totalAmountSpent <= 60");
    assert_eq!(rules[0].notation_map.get("l").unwrap(), "playerLevels.l");
    assert_eq!(rules[0].map_names, vec!["playerLevels".to_string()]);
}

#[tokio::test]
async fn query_returns_active_rules_by_priority() {
    let (fx, _db) = fixture().await;
    let low = fx
        .engine
        .save_rule(level_rule(fx.season_id, "l1.totalAmountSpent <= 10").with_priority(5))
        .await
        .unwrap();
    let high = fx
        .engine
        .save_rule(level_rule(fx.season_id, "l2.totalAmountSpent <= 20").with_priority(1))
        .await
        .unwrap();
    fx.engine
        .save_rule(level_rule(fx.season_id, "l3.totalAmountSpent <= 30").inactive())
        .await
        .unwrap();
    fx.engine
        .save_rule(Rule::new(fx.season_id, "other", "team.totalPlayer <= 3"))
        .await
        .unwrap();

    let rules = fx
        .engine
        .rules_by_season_and_context(fx.season_id, NEXT_BID_BUDGET)
        .await
        .unwrap();
    let ids: Vec<_> = rules.iter().map(|rule| rule.id).collect();
    assert_eq!(ids, vec![high, low]);

    let err = fx
        .engine
        .rules_by_season_and_context(fx.season_id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let remaining = fx
        .engine
        .evaluate_rules(fx.season_id, NEXT_BID_BUDGET, &EvaluationContext::default())
        .await
        .unwrap();
    assert_eq!(remaining, vec![20.0, 10.0]);
}
