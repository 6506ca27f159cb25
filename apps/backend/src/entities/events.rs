use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "entity_type")]
    pub entity_type: String,
    #[sea_orm(column_name = "entity_id")]
    pub entity_id: i64,
    #[sea_orm(column_name = "event_type")]
    pub event_type: String,
    pub payload: Json,
    #[sea_orm(column_name = "entity_version")]
    pub entity_version: i32,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
