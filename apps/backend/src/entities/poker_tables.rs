use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "COMPLETE")]
    Complete,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poker_tables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_name = "seat_capacity", column_type = "SmallInteger")]
    pub seat_capacity: i16,
    #[sea_orm(column_name = "small_blind")]
    pub small_blind: i64,
    #[sea_orm(column_name = "big_blind")]
    pub big_blind: i64,
    pub ante: i64,
    #[sea_orm(column_name = "dealer_seat", column_type = "SmallInteger")]
    pub dealer_seat: Option<i16>,
    #[sea_orm(column_name = "turn_timeout_secs")]
    pub turn_timeout_secs: Option<i32>,
    pub status: TableStatus,
    #[sea_orm(column_name = "winner_seat", column_type = "SmallInteger")]
    pub winner_seat: Option<i16>,
    #[sea_orm(column_name = "rng_seed")]
    pub rng_seed: i64,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hands::Entity")]
    Hands,
    #[sea_orm(has_many = "super::table_seats::Entity")]
    TableSeats,
}

impl Related<super::hands::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hands.def()
    }
}

impl Related<super::table_seats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableSeats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
