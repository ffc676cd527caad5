//! Seasons and the caps a season puts on every team.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{MoneyCents, SeasonLimits};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seasons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub year: i32,
    /// Cents.
    pub min_player_amount: i64,
    /// Cents.
    pub budget_limit: i64,
    pub max_players_allowed: i32,
    pub max_rtm_allowed: i32,
    pub max_free_allowed: i32,
    pub is_auction_completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_seasons::Entity")]
    TeamSeasons,
    #[sea_orm(has_many = "super::rule::Entity")]
    Rules,
}

impl Related<super::team_seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamSeasons.def()
    }
}

impl Related<super::rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for SeasonLimits {
    fn from(value: &Model) -> Self {
        Self {
            year: value.year,
            budget_limit: MoneyCents::new(value.budget_limit),
            min_player_amount: MoneyCents::new(value.min_player_amount),
            max_players_allowed: value.max_players_allowed,
            max_rtm_allowed: value.max_rtm_allowed,
            max_free_allowed: value.max_free_allowed,
        }
    }
}
