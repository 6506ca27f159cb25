//! SeaORM adapter for poker tables - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::poker_tables::{self, TableStatus};

pub mod dto;

pub use dto::{TableCreate, TableUpdate};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<poker_tables::Model>, sea_orm::DbErr> {
    poker_tables::Entity::find_by_id(table_id).one(conn).await
}

/// Find table by ID or return RecordNotFound error.
pub async fn require_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<poker_tables::Model, sea_orm::DbErr> {
    find_by_id(conn, table_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("Table {table_id} not found")))
}

/// Ids of every table that can still produce hands, oldest first.
pub async fn find_open_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    let rows = poker_tables::Entity::find()
        .filter(poker_tables::Column::Status.ne(TableStatus::Complete))
        .order_by_asc(poker_tables::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|t| t.id).collect())
}

pub async fn create_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TableCreate,
) -> Result<poker_tables::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let table = poker_tables::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        seat_capacity: Set(i16::from(dto.seat_capacity)),
        small_blind: Set(dto.small_blind),
        big_blind: Set(dto.big_blind),
        ante: Set(dto.ante),
        dealer_seat: Set(None),
        turn_timeout_secs: Set(dto.turn_timeout_secs),
        status: Set(TableStatus::Waiting),
        winner_seat: Set(None),
        rng_seed: Set(dto.rng_seed),
        created_at: Set(now),
        updated_at: Set(now),
        version: Set(1),
    };
    table.insert(conn).await
}

/// Apply a version-checked update, then refetch.
///
/// Zero rows affected means either the table is gone (RecordNotFound) or another
/// writer got there first (OPTIMISTIC_LOCK payload with both versions).
pub async fn update_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TableUpdate,
) -> Result<poker_tables::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let mut update = poker_tables::Entity::update_many()
        .col_expr(poker_tables::Column::UpdatedAt, Expr::value(now))
        .col_expr(
            poker_tables::Column::Version,
            Expr::col(poker_tables::Column::Version).add(1),
        );
    if let Some(status) = dto.status {
        update = update.col_expr(poker_tables::Column::Status, Expr::value(status));
    }
    if let Some(dealer) = dto.dealer_seat {
        update = update.col_expr(
            poker_tables::Column::DealerSeat,
            Expr::value(dealer.map(i16::from)),
        );
    }
    if let Some(winner) = dto.winner_seat {
        update = update.col_expr(
            poker_tables::Column::WinnerSeat,
            Expr::value(winner.map(i16::from)),
        );
    }

    let result = update
        .filter(poker_tables::Column::Id.eq(dto.id))
        .filter(poker_tables::Column::Version.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let current = find_by_id(conn, dto.id).await?;
        return Err(match current {
            Some(table) => sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                dto.expected_version, table.version
            )),
            None => sea_orm::DbErr::RecordNotFound(format!("Table {} not found", dto.id)),
        });
    }

    require_table(conn, dto.id).await
}
