//! Action log repository functions.

use sea_orm::ConnectionTrait;

use super::seat_from_db;
use crate::adapters::actions_sea as actions_adapter;
use crate::domain::actions::ActionKind;
use crate::domain::hand_phase::HandPhase;
use crate::entities::hand_actions;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub hand_id: i64,
    pub seq: i32,
    pub seat_index: u8,
    pub kind: ActionKind,
    /// Seat's street total after the action.
    pub amount: i64,
    pub chips_added: i64,
    pub phase: HandPhase,
    pub created_at: time::OffsetDateTime,
}

impl TryFrom<hand_actions::Model> for ActionRecord {
    type Error = DomainError;

    fn try_from(model: hand_actions::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            hand_id: model.hand_id,
            seq: model.seq,
            seat_index: seat_from_db(model.seat_index)?,
            kind: model
                .kind
                .parse()
                .map_err(|_| DomainError::data_corruption(format!("unknown action kind '{}'", model.kind)))?,
            amount: model.amount,
            chips_added: model.chips_added,
            phase: model.phase.parse()?,
            created_at: model.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewAction {
    pub seat_index: u8,
    pub kind: ActionKind,
    pub amount: i64,
    pub chips_added: i64,
    pub phase: HandPhase,
}

/// Append at the next sequence number; the unique `(hand_id, seq)` index turns a
/// concurrent append into a version conflict.
pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
    action: NewAction,
    now: time::OffsetDateTime,
) -> Result<ActionRecord, DomainError> {
    let seq = actions_adapter::next_seq(conn, hand_id).await?;
    let dto = actions_adapter::ActionCreate {
        hand_id,
        seq,
        seat_index: action.seat_index,
        kind: action.kind.as_str().to_string(),
        amount: action.amount,
        chips_added: action.chips_added,
        phase: action.phase.as_str().to_string(),
        created_at: now,
    };
    ActionRecord::try_from(actions_adapter::append(conn, dto).await?)
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<ActionRecord>, DomainError> {
    actions_adapter::find_all_by_hand(conn, hand_id)
        .await?
        .into_iter()
        .map(ActionRecord::try_from)
        .collect()
}

pub async fn delete_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<u64, DomainError> {
    Ok(actions_adapter::delete_by_hand(conn, hand_id).await?)
}
