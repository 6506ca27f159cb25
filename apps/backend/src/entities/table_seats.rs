use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "table_seats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "table_id")]
    pub table_id: i64,
    #[sea_orm(column_name = "seat_index", column_type = "SmallInteger")]
    pub seat_index: i16,
    #[sea_orm(column_name = "player_id")]
    pub player_id: i64,
    pub stack: i64,
    pub status: String,
    #[sea_orm(column_name = "current_bet")]
    pub current_bet: i64,
    #[sea_orm(column_name = "total_contributed")]
    pub total_contributed: i64,
    #[sea_orm(column_name = "hole_cards")]
    pub hole_cards: Option<Json>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poker_tables::Entity",
        from = "Column::TableId",
        to = "super::poker_tables::Column::Id"
    )]
    PokerTable,
}

impl Related<super::poker_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PokerTable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
