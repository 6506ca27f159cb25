//! SeaORM adapter for derived pot layers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use serde_json::Value;

use crate::entities::hand_pots;

#[derive(Debug, Clone)]
pub struct PotCreate {
    pub layer_index: u8,
    pub amount: i64,
    pub eligible_seats: Value,
}

/// Replace every layer of a hand; layers are derived, so the old set is discarded.
pub async fn replace_for_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
    layers: Vec<PotCreate>,
) -> Result<Vec<hand_pots::Model>, sea_orm::DbErr> {
    delete_by_hand(conn, hand_id).await?;

    let now = time::OffsetDateTime::now_utc();
    let mut out = Vec::with_capacity(layers.len());
    for layer in layers {
        let model = hand_pots::ActiveModel {
            id: NotSet,
            hand_id: Set(hand_id),
            layer_index: Set(i16::from(layer.layer_index)),
            amount: Set(layer.amount),
            eligible_seats: Set(layer.eligible_seats),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;
        out.push(model);
    }
    Ok(out)
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<hand_pots::Model>, sea_orm::DbErr> {
    hand_pots::Entity::find()
        .filter(hand_pots::Column::HandId.eq(hand_id))
        .order_by_asc(hand_pots::Column::LayerIndex)
        .all(conn)
        .await
}

pub async fn delete_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = hand_pots::Entity::delete_many()
        .filter(hand_pots::Column::HandId.eq(hand_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
