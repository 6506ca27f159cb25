//! DTOs for tables_sea adapter.

use crate::entities::poker_tables::TableStatus;

/// DTO for creating a table.
#[derive(Debug, Clone)]
pub struct TableCreate {
    pub name: String,
    pub seat_capacity: u8,
    pub small_blind: i64,
    pub big_blind: i64,
    pub ante: i64,
    pub turn_timeout_secs: Option<i32>,
    pub rng_seed: i64,
}

/// Version-checked table update. Every update bumps `version` by one, even
/// when no column changes.
///
/// Nullable columns are three-state: None = no change, Some(None) = clear.
#[derive(Debug, Clone)]
pub struct TableUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub status: Option<TableStatus>,
    pub dealer_seat: Option<Option<u8>>,
    pub winner_seat: Option<Option<u8>>,
}

impl TableUpdate {
    pub fn new(id: i64, expected_version: i32) -> Self {
        Self {
            id,
            expected_version,
            status: None,
            dealer_seat: None,
            winner_seat: None,
        }
    }

    pub fn with_status(mut self, status: TableStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dealer_seat(mut self, seat: u8) -> Self {
        self.dealer_seat = Some(Some(seat));
        self
    }

    /// Set or clear the button.
    pub fn with_dealer_seat_opt(mut self, seat: Option<u8>) -> Self {
        self.dealer_seat = Some(seat);
        self
    }

    pub fn with_winner_seat(mut self, seat: u8) -> Self {
        self.winner_seat = Some(Some(seat));
        self
    }
}
