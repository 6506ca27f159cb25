//! DTOs for hands_sea adapter.

use serde_json::Value;
use time::OffsetDateTime;

/// DTO for inserting a freshly created hand.
#[derive(Debug, Clone)]
pub struct HandCreate {
    pub table_id: i64,
    pub hand_no: i32,
    pub phase: String,
    pub dealer_seat: u8,
    pub small_blind_seat: u8,
    pub big_blind_seat: u8,
    pub min_raise_increment: i64,
    pub deck: Value,
    pub community_cards: Value,
    pub created_at: OffsetDateTime,
}

/// Full write of every mutable hand column, checked against `expected_version`.
#[derive(Debug, Clone)]
pub struct HandWrite {
    pub id: i64,
    pub expected_version: i32,
    pub phase: String,
    pub current_actor_seat: Option<u8>,
    pub current_bet: i64,
    pub min_raise_increment: i64,
    pub pot: i64,
    pub community_cards: Value,
    pub deck: Value,
    pub action_deadline: Option<OffsetDateTime>,
    pub showdown_started_at: Option<OffsetDateTime>,
    pub last_runout_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
}
