//! SeaORM adapter for the append-only hand action log.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::hand_actions;

#[derive(Debug, Clone)]
pub struct ActionCreate {
    pub hand_id: i64,
    pub seq: i32,
    pub seat_index: u8,
    pub kind: String,
    pub amount: i64,
    pub chips_added: i64,
    pub phase: String,
    pub created_at: time::OffsetDateTime,
}

/// Next sequence number for a hand (1 for the first action).
pub async fn next_seq<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<i32, sea_orm::DbErr> {
    let max: Option<i32> = hand_actions::Entity::find()
        .select_only()
        .column_as(hand_actions::Column::Seq.max(), "max_seq")
        .filter(hand_actions::Column::HandId.eq(hand_id))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?
        .flatten();
    Ok(max.unwrap_or(0) + 1)
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ActionCreate,
) -> Result<hand_actions::Model, sea_orm::DbErr> {
    hand_actions::ActiveModel {
        id: NotSet,
        hand_id: Set(dto.hand_id),
        seq: Set(dto.seq),
        seat_index: Set(i16::from(dto.seat_index)),
        kind: Set(dto.kind),
        amount: Set(dto.amount),
        chips_added: Set(dto.chips_added),
        phase: Set(dto.phase),
        created_at: Set(dto.created_at),
    }
    .insert(conn)
    .await
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<hand_actions::Model>, sea_orm::DbErr> {
    hand_actions::Entity::find()
        .filter(hand_actions::Column::HandId.eq(hand_id))
        .order_by_asc(hand_actions::Column::Seq)
        .all(conn)
        .await
}

pub async fn delete_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = hand_actions::Entity::delete_many()
        .filter(hand_actions::Column::HandId.eq(hand_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
