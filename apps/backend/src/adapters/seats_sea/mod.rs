//! SeaORM adapter for table seats - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::table_seats;

pub mod dto;

pub use dto::{SeatCreate, SeatWrite};

/// All seats at a table ordered by seat index.
pub async fn find_all_by_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Vec<table_seats::Model>, sea_orm::DbErr> {
    table_seats::Entity::find()
        .filter(table_seats::Column::TableId.eq(table_id))
        .order_by_asc(table_seats::Column::SeatIndex)
        .all(conn)
        .await
}

pub async fn find_by_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    seat_index: u8,
) -> Result<Option<table_seats::Model>, sea_orm::DbErr> {
    table_seats::Entity::find()
        .filter(table_seats::Column::TableId.eq(table_id))
        .filter(table_seats::Column::SeatIndex.eq(i16::from(seat_index)))
        .one(conn)
        .await
}

pub async fn find_by_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    player_id: i64,
) -> Result<Option<table_seats::Model>, sea_orm::DbErr> {
    table_seats::Entity::find()
        .filter(table_seats::Column::TableId.eq(table_id))
        .filter(table_seats::Column::PlayerId.eq(player_id))
        .one(conn)
        .await
}

pub async fn require_by_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    player_id: i64,
) -> Result<table_seats::Model, sea_orm::DbErr> {
    find_by_player(conn, table_id, player_id).await?.ok_or_else(|| {
        sea_orm::DbErr::RecordNotFound(format!(
            "Seat for player {player_id} at table {table_id} not found"
        ))
    })
}

pub async fn create_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SeatCreate,
) -> Result<table_seats::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let seat = table_seats::ActiveModel {
        id: NotSet,
        table_id: Set(dto.table_id),
        seat_index: Set(i16::from(dto.seat_index)),
        player_id: Set(dto.player_id),
        stack: Set(dto.stack),
        status: Set(dto.status),
        current_bet: Set(0),
        total_contributed: Set(0),
        hole_cards: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        version: Set(1),
    };
    seat.insert(conn).await
}

pub async fn write_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SeatWrite,
) -> Result<table_seats::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = table_seats::Entity::update_many()
        .col_expr(table_seats::Column::Stack, Expr::value(dto.stack))
        .col_expr(table_seats::Column::Status, Expr::value(dto.status))
        .col_expr(table_seats::Column::CurrentBet, Expr::value(dto.current_bet))
        .col_expr(
            table_seats::Column::TotalContributed,
            Expr::value(dto.total_contributed),
        )
        .col_expr(table_seats::Column::HoleCards, Expr::value(dto.hole_cards))
        .col_expr(table_seats::Column::UpdatedAt, Expr::value(now))
        .col_expr(
            table_seats::Column::Version,
            Expr::col(table_seats::Column::Version).add(1),
        )
        .filter(table_seats::Column::Id.eq(dto.id))
        .filter(table_seats::Column::Version.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let current = table_seats::Entity::find_by_id(dto.id).one(conn).await?;
        return Err(match current {
            Some(seat) => sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                dto.expected_version, seat.version
            )),
            None => sea_orm::DbErr::RecordNotFound(format!("Seat {} not found", dto.id)),
        });
    }

    table_seats::Entity::find_by_id(dto.id)
        .one(conn)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("Seat {} not found", dto.id)))
}
