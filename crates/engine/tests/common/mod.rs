//! Database fixture shared by the integration tests.
#![allow(dead_code)]

use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};

use engine::{
    Engine, LevelAggregate, MoneyCents, player_levels, players, seasons, team_seasons, teams,
};
use migration::MigratorTrait;
use uuid::Uuid;

pub struct Fixture {
    pub engine: Engine,
    pub season_id: Uuid,
    pub csk: Uuid,
    pub mi: Uuid,
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn insert_team_season(db: &DatabaseConnection, season_id: Uuid, code: &str) -> Uuid {
    let team_id = Uuid::new_v4();
    teams::ActiveModel {
        id: Set(team_id),
        code: Set(code.to_uppercase()),
        name: Set(format!("Team {code}")),
    }
    .insert(db)
    .await
    .unwrap();

    let id = Uuid::new_v4();
    team_seasons::ActiveModel {
        id: Set(id),
        code: Set(format!("{code}-2025")),
        team_id: Set(team_id),
        season_id: Set(season_id),
        total_amount_spent: Set(0),
        total_rtm_used: Set(0),
        total_free_used: Set(0),
        total_player: Set(0),
        is_rtm_eligible: Set(true),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

/// One season (budget 100.00, 3 players, 1 RTM, 1 free), two team-seasons,
/// tiers `l1`..`l3` and players `p1`..`p4`.
pub async fn fixture() -> (Fixture, DatabaseConnection) {
    let (engine, db) = engine_with_db().await;

    let season_id = Uuid::new_v4();
    seasons::ActiveModel {
        id: Set(season_id),
        code: Set("ipl-2025".to_string()),
        year: Set(2025),
        min_player_amount: Set(200),
        budget_limit: Set(10_000),
        max_players_allowed: Set(3),
        max_rtm_allowed: Set(1),
        max_free_allowed: Set(1),
        is_auction_completed: Set(false),
    }
    .insert(&db)
    .await
    .unwrap();

    let mut levels = Vec::new();
    for code in ["l1", "l2", "l3"] {
        let id = Uuid::new_v4();
        player_levels::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            name: Set(format!("Level {code}")),
        }
        .insert(&db)
        .await
        .unwrap();
        levels.push(id);
    }

    for (code, level) in [("p1", 0), ("p2", 0), ("p3", 1), ("p4", 2)] {
        players::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            name: Set(format!("Player {code}")),
            player_level_id: Set(levels[level]),
            is_active: Set(true),
        }
        .insert(&db)
        .await
        .unwrap();
    }

    let csk = insert_team_season(&db, season_id, "csk").await;
    let mi = insert_team_season(&db, season_id, "mi").await;

    (
        Fixture {
            engine,
            season_id,
            csk,
            mi,
        },
        db,
    )
}

pub fn level<'a>(aggregates: &'a [LevelAggregate], code: &str) -> &'a LevelAggregate {
    aggregates
        .iter()
        .find(|aggregate| aggregate.level_code == code)
        .unwrap()
}

pub fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}
