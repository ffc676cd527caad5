use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, players, roster, seasons, team_seasons};

use super::Engine;

impl Engine {
    pub(super) async fn require_season(
        &self,
        db: &DatabaseTransaction,
        season_id: Uuid,
    ) -> ResultEngine<seasons::Model> {
        seasons::Entity::find_by_id(season_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("season not exists".to_string()))
    }

    pub(super) async fn require_team_season(
        &self,
        db: &DatabaseTransaction,
        team_season_id: Uuid,
    ) -> ResultEngine<team_seasons::Model> {
        team_seasons::Entity::find_by_id(team_season_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("team season not exists".to_string()))
    }

    pub(super) async fn require_team_season_by_code(
        &self,
        db: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<team_seasons::Model> {
        team_seasons::Entity::find()
            .filter(team_seasons::Column::Code.eq(code))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("team season {code}")))
    }

    pub(super) async fn require_player_by_code(
        &self,
        db: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<players::Model> {
        players::Entity::find()
            .filter(players::Column::Code.eq(code))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("player {code}")))
    }

    pub(super) async fn find_roster_entry_by_code(
        &self,
        db: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<Option<roster::Model>> {
        roster::Entity::find()
            .filter(roster::Column::Code.eq(code))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_roster_entry_by_code(
        &self,
        db: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<roster::Model> {
        self.find_roster_entry_by_code(db, code)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("roster entry {code}")))
    }
}
