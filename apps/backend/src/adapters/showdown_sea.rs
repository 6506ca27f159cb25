//! SeaORM adapter for per-seat showdown results.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use serde_json::Value;

use crate::entities::showdown_results;

#[derive(Debug, Clone)]
pub struct ShowdownResultCreate {
    pub hand_id: i64,
    pub seat_index: u8,
    pub rank_category: String,
    pub description: String,
    pub best_five: Value,
    pub amount_won: i64,
}

pub async fn insert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ShowdownResultCreate,
) -> Result<showdown_results::Model, sea_orm::DbErr> {
    showdown_results::ActiveModel {
        id: NotSet,
        hand_id: Set(dto.hand_id),
        seat_index: Set(i16::from(dto.seat_index)),
        rank_category: Set(dto.rank_category),
        description: Set(dto.description),
        best_five: Set(dto.best_five),
        amount_won: Set(dto.amount_won),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<showdown_results::Model>, sea_orm::DbErr> {
    showdown_results::Entity::find()
        .filter(showdown_results::Column::HandId.eq(hand_id))
        .order_by_asc(showdown_results::Column::SeatIndex)
        .all(conn)
        .await
}
