use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hands")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "table_id")]
    pub table_id: i64,
    #[sea_orm(column_name = "hand_no")]
    pub hand_no: i32,
    pub phase: String,
    #[sea_orm(column_name = "dealer_seat", column_type = "SmallInteger")]
    pub dealer_seat: i16,
    #[sea_orm(column_name = "small_blind_seat", column_type = "SmallInteger")]
    pub small_blind_seat: i16,
    #[sea_orm(column_name = "big_blind_seat", column_type = "SmallInteger")]
    pub big_blind_seat: i16,
    #[sea_orm(column_name = "current_actor_seat", column_type = "SmallInteger")]
    pub current_actor_seat: Option<i16>,
    #[sea_orm(column_name = "current_bet")]
    pub current_bet: i64,
    #[sea_orm(column_name = "min_raise_increment")]
    pub min_raise_increment: i64,
    pub pot: i64,
    #[sea_orm(column_name = "community_cards")]
    pub community_cards: Json,
    pub deck: Json,
    #[sea_orm(column_name = "action_deadline")]
    pub action_deadline: Option<OffsetDateTime>,
    #[sea_orm(column_name = "showdown_started_at")]
    pub showdown_started_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "last_runout_at")]
    pub last_runout_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "completed_at")]
    pub completed_at: Option<OffsetDateTime>,
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
    #[sea_orm(has_many = "super::hand_actions::Entity")]
    HandActions,
    #[sea_orm(has_many = "super::hand_pots::Entity")]
    HandPots,
    #[sea_orm(has_many = "super::showdown_results::Entity")]
    ShowdownResults,
}

impl Related<super::poker_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PokerTable.def()
    }
}

impl Related<super::hand_actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HandActions.def()
    }
}

impl Related<super::hand_pots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HandPots.def()
    }
}

impl Related<super::showdown_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowdownResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
