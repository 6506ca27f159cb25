//! SeaORM adapter for hands - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::hands;

pub mod dto;

pub use dto::{HandCreate, HandWrite};

/// Phase string of the only terminal phase.
const COMPLETE: &str = "complete";

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Option<hands::Model>, sea_orm::DbErr> {
    hands::Entity::find_by_id(hand_id).one(conn).await
}

pub async fn require_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<hands::Model, sea_orm::DbErr> {
    find_by_id(conn, hand_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("Hand {hand_id} not found")))
}

/// The table's non-terminal hand, if any.
pub async fn find_live_for_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<hands::Model>, sea_orm::DbErr> {
    hands::Entity::find()
        .filter(hands::Column::TableId.eq(table_id))
        .filter(hands::Column::Phase.ne(COMPLETE))
        .order_by_desc(hands::Column::HandNo)
        .one(conn)
        .await
}

/// Most recent hand of the table regardless of phase.
pub async fn find_latest_for_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<hands::Model>, sea_orm::DbErr> {
    hands::Entity::find()
        .filter(hands::Column::TableId.eq(table_id))
        .order_by_desc(hands::Column::HandNo)
        .one(conn)
        .await
}

/// Next monotonic hand number for the table (1 for the first hand).
pub async fn next_hand_no<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<i32, sea_orm::DbErr> {
    let max: Option<i32> = hands::Entity::find()
        .select_only()
        .column_as(hands::Column::HandNo.max(), "max_hand_no")
        .filter(hands::Column::TableId.eq(table_id))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?
        .flatten();
    Ok(max.unwrap_or(0) + 1)
}

pub async fn create_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: HandCreate,
) -> Result<hands::Model, sea_orm::DbErr> {
    let hand = hands::ActiveModel {
        id: NotSet,
        table_id: Set(dto.table_id),
        hand_no: Set(dto.hand_no),
        phase: Set(dto.phase),
        dealer_seat: Set(i16::from(dto.dealer_seat)),
        small_blind_seat: Set(i16::from(dto.small_blind_seat)),
        big_blind_seat: Set(i16::from(dto.big_blind_seat)),
        current_actor_seat: Set(None),
        current_bet: Set(0),
        min_raise_increment: Set(dto.min_raise_increment),
        pot: Set(0),
        community_cards: Set(dto.community_cards),
        deck: Set(dto.deck),
        action_deadline: Set(None),
        showdown_started_at: Set(None),
        last_runout_at: Set(None),
        completed_at: Set(None),
        created_at: Set(dto.created_at),
        updated_at: Set(dto.created_at),
        version: Set(1),
    };
    hand.insert(conn).await
}

/// Write every mutable column if the stored version still matches, then refetch.
pub async fn write_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: HandWrite,
) -> Result<hands::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = hands::Entity::update_many()
        .col_expr(hands::Column::Phase, Expr::value(dto.phase))
        .col_expr(
            hands::Column::CurrentActorSeat,
            Expr::value(dto.current_actor_seat.map(i16::from)),
        )
        .col_expr(hands::Column::CurrentBet, Expr::value(dto.current_bet))
        .col_expr(
            hands::Column::MinRaiseIncrement,
            Expr::value(dto.min_raise_increment),
        )
        .col_expr(hands::Column::Pot, Expr::value(dto.pot))
        .col_expr(hands::Column::CommunityCards, Expr::value(dto.community_cards))
        .col_expr(hands::Column::Deck, Expr::value(dto.deck))
        .col_expr(hands::Column::ActionDeadline, Expr::value(dto.action_deadline))
        .col_expr(
            hands::Column::ShowdownStartedAt,
            Expr::value(dto.showdown_started_at),
        )
        .col_expr(hands::Column::LastRunoutAt, Expr::value(dto.last_runout_at))
        .col_expr(hands::Column::CompletedAt, Expr::value(dto.completed_at))
        .col_expr(hands::Column::UpdatedAt, Expr::value(now))
        .col_expr(hands::Column::Version, Expr::col(hands::Column::Version).add(1))
        .filter(hands::Column::Id.eq(dto.id))
        .filter(hands::Column::Version.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let current = find_by_id(conn, dto.id).await?;
        return Err(match current {
            Some(hand) => sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                dto.expected_version, hand.version
            )),
            None => sea_orm::DbErr::RecordNotFound(format!("Hand {} not found", dto.id)),
        });
    }

    require_hand(conn, dto.id).await
}

/// Delete a hand (and, by cascade, its actions, pots and results) at a known version.
pub async fn delete_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
    expected_version: i32,
) -> Result<(), sea_orm::DbErr> {
    let result = hands::Entity::delete_many()
        .filter(hands::Column::Id.eq(hand_id))
        .filter(hands::Column::Version.eq(expected_version))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        if let Some(hand) = find_by_id(conn, hand_id).await? {
            return Err(sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                expected_version, hand.version
            )));
        }
    }
    Ok(())
}
