//! Roster entries: which player a team-season bought, for how much.
//!
//! The roster is the source of truth; every aggregate is derived from it.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::MoneyCents;

/// Assign, update or move a player.
///
/// `code` is the code of an existing entry when editing one; `None` creates a
/// new entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RosterRequest {
    pub code: Option<String>,
    pub team_season_code: String,
    pub player_code: String,
    pub sold_amount: Option<MoneyCents>,
    pub is_free: bool,
    pub is_rtm_used: bool,
}

impl RosterRequest {
    pub fn new(team_season_code: &str, player_code: &str, sold_amount: MoneyCents) -> Self {
        Self {
            team_season_code: team_season_code.to_string(),
            player_code: player_code.to_string(),
            sold_amount: Some(sold_amount),
            ..Default::default()
        }
    }

    /// Edit the entry identified by `code` instead of creating one.
    pub fn editing(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    pub fn rtm(mut self) -> Self {
        self.is_rtm_used = true;
        self
    }
}

/// Entry code: player code followed by team-season code.
pub(crate) fn entry_code(player_code: &str, team_season_code: &str) -> String {
    format!("{player_code}{team_season_code}")
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "roster_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub player_id: Uuid,
    pub team_season_id: Uuid,
    /// Cents; `None` for entries recorded without an amount.
    pub sold_amount: Option<i64>,
    pub is_free: bool,
    pub is_rtm_used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Player,
    #[sea_orm(
        belongs_to = "super::team_seasons::Entity",
        from = "Column::TeamSeasonId",
        to = "super::team_seasons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TeamSeason,
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::team_seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamSeason.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
