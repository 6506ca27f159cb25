//! Table repository functions for domain layer.

use sea_orm::ConnectionTrait;

use super::{opt_seat_from_db, seat_from_db};
use crate::adapters::tables_sea as tables_adapter;
use crate::entities::poker_tables::{self, TableStatus};
use crate::errors::domain::DomainError;

pub use tables_adapter::{TableCreate, TableUpdate};

/// Table domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct PokerTable {
    pub id: i64,
    pub name: String,
    pub seat_capacity: u8,
    pub small_blind: i64,
    pub big_blind: i64,
    pub ante: i64,
    pub dealer_seat: Option<u8>,
    pub turn_timeout_secs: Option<i32>,
    pub status: TableStatus,
    pub winner_seat: Option<u8>,
    pub rng_seed: i64,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
    pub version: i32,
}

impl PokerTable {
    pub fn is_complete(&self) -> bool {
        self.status == TableStatus::Complete
    }

    /// Per-turn budget; `None` means players may think forever.
    pub fn turn_timeout(&self) -> Option<time::Duration> {
        self.turn_timeout_secs
            .map(|secs| time::Duration::seconds(i64::from(secs)))
    }

    /// Version-checked update that changes nothing but the version.
    pub fn touch(&self) -> TableUpdate {
        TableUpdate::new(self.id, self.version)
    }
}

impl TryFrom<poker_tables::Model> for PokerTable {
    type Error = DomainError;

    fn try_from(model: poker_tables::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            seat_capacity: seat_from_db(model.seat_capacity)?,
            small_blind: model.small_blind,
            big_blind: model.big_blind,
            ante: model.ante,
            dealer_seat: opt_seat_from_db(model.dealer_seat)?,
            turn_timeout_secs: model.turn_timeout_secs,
            status: model.status,
            winner_seat: opt_seat_from_db(model.winner_seat)?,
            rng_seed: model.rng_seed,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        })
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<PokerTable>, DomainError> {
    tables_adapter::find_by_id(conn, table_id)
        .await?
        .map(PokerTable::try_from)
        .transpose()
}

pub async fn require_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<PokerTable, DomainError> {
    PokerTable::try_from(tables_adapter::require_table(conn, table_id).await?)
}

pub async fn find_open_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    Ok(tables_adapter::find_open_ids(conn).await?)
}

pub async fn create_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TableCreate,
) -> Result<PokerTable, DomainError> {
    PokerTable::try_from(tables_adapter::create_table(conn, dto).await?)
}

/// Update with optimistic locking; always bumps `version`.
pub async fn update_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TableUpdate,
) -> Result<PokerTable, DomainError> {
    PokerTable::try_from(tables_adapter::update_table(conn, dto).await?)
}
