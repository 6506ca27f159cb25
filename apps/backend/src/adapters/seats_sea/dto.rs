//! DTOs for seats_sea adapter.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct SeatCreate {
    pub table_id: i64,
    pub seat_index: u8,
    pub player_id: i64,
    pub stack: i64,
    pub status: String,
}

/// Full write of the per-hand seat columns, checked against `expected_version`.
#[derive(Debug, Clone)]
pub struct SeatWrite {
    pub id: i64,
    pub expected_version: i32,
    pub stack: i64,
    pub status: String,
    pub current_bet: i64,
    pub total_contributed: i64,
    pub hole_cards: Option<Value>,
}
