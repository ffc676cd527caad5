//! Per-tier aggregates of a team-season.
//!
//! A materialized view over the roster: one row per (team-season, tier),
//! rewritten on every recomputation pass and never edited by hand.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{LevelAggregate, MoneyCents};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "level_aggregates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_season_id: Uuid,
    pub player_level_id: Uuid,
    /// Cents.
    pub total_amount_spent: i64,
    pub total_player_count: i32,
    /// Cents; cached next-bid ceiling.
    pub next_player_budget: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team_seasons::Entity",
        from = "Column::TeamSeasonId",
        to = "super::team_seasons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TeamSeason,
    #[sea_orm(
        belongs_to = "super::player_levels::Entity",
        from = "Column::PlayerLevelId",
        to = "super::player_levels::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PlayerLevel,
}

impl Related<super::team_seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamSeason.def()
    }
}

impl Related<super::player_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerLevel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(Model, &str)> for LevelAggregate {
    fn from((model, level_code): (Model, &str)) -> Self {
        Self {
            level_code: level_code.to_string(),
            total_amount_spent: MoneyCents::new(model.total_amount_spent),
            total_player_count: model.total_player_count,
            next_player_budget: model.next_player_budget.map(MoneyCents::new),
        }
    }
}
