//! Persisted pot layers.

use sea_orm::ConnectionTrait;

use crate::adapters::pots_sea as pots_adapter;
use crate::domain::cards_serde::{decode_seats, encode_seats};
use crate::domain::pots::PotLayer;
use crate::errors::domain::DomainError;

pub async fn replace_for_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
    layers: &[PotLayer],
) -> Result<(), DomainError> {
    let rows = layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let layer_index = u8::try_from(i).map_err(|_| {
                DomainError::data_corruption(format!("pot layer index {i} out of range"))
            })?;
            Ok(pots_adapter::PotCreate {
                layer_index,
                amount: layer.amount,
                eligible_seats: encode_seats(&layer.eligible),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    pots_adapter::replace_for_hand(conn, hand_id, rows).await?;
    Ok(())
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<PotLayer>, DomainError> {
    pots_adapter::find_all_by_hand(conn, hand_id)
        .await?
        .into_iter()
        .map(|row| {
            Ok(PotLayer {
                amount: row.amount,
                eligible: decode_seats(&row.eligible_seats)?,
            })
        })
        .collect()
}

pub async fn delete_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<(), DomainError> {
    pots_adapter::delete_by_hand(conn, hand_id).await?;
    Ok(())
}
