use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub player_level_id: Uuid,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::player_levels::Entity",
        from = "Column::PlayerLevelId",
        to = "super::player_levels::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    PlayerLevel,
    #[sea_orm(has_many = "super::roster::Entity")]
    Roster,
}

impl Related<super::player_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerLevel.def()
    }
}

impl Related<super::roster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roster.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
