//! A team's participation in one season, with its running totals.
//!
//! The totals are denormalized from the roster and rewritten by every
//! recomputation pass.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{MoneyCents, TeamView};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "team_seasons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub team_id: Uuid,
    pub season_id: Uuid,
    /// Cents.
    pub total_amount_spent: i64,
    pub total_rtm_used: i32,
    pub total_free_used: i32,
    pub total_player: i32,
    pub is_rtm_eligible: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::seasons::Entity",
        from = "Column::SeasonId",
        to = "super::seasons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Season,
    #[sea_orm(has_many = "super::roster::Entity")]
    Roster,
    #[sea_orm(has_many = "super::level_aggregates::Entity")]
    LevelAggregates,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl Related<super::roster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roster.def()
    }
}

impl Related<super::level_aggregates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LevelAggregates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for TeamView {
    fn from(value: &Model) -> Self {
        Self {
            total_amount_spent: MoneyCents::new(value.total_amount_spent),
            total_rtm_used: value.total_rtm_used,
            total_free_used: value.total_free_used,
            total_player: value.total_player,
        }
    }
}
