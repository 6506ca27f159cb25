use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showdown_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "hand_id")]
    pub hand_id: i64,
    #[sea_orm(column_name = "seat_index", column_type = "SmallInteger")]
    pub seat_index: i16,
    #[sea_orm(column_name = "rank_category")]
    pub rank_category: String,
    pub description: String,
    #[sea_orm(column_name = "best_five")]
    pub best_five: Json,
    #[sea_orm(column_name = "amount_won")]
    pub amount_won: i64,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hands::Entity",
        from = "Column::HandId",
        to = "super::hands::Column::Id"
    )]
    Hand,
}

impl Related<super::hands::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
