//! Teams table (master data, minimal entity).

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_seasons::Entity")]
    TeamSeasons,
}

impl Related<super::team_seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamSeasons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
