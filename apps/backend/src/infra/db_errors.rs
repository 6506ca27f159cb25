//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos convert here, and higher layers
//! map `DomainError` to `AppError` via `From`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

/// Prefix of the structured payload adapters emit when a versioned write misses.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Unique indexes we know about, keyed by the SQLite column list and the
/// Postgres index name.
fn map_unique_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("hands.table_id, hands.hand_no")
        || error_msg.contains("ux_hands_table_hand_no")
    {
        return Some((ConflictKind::HandInProgress, "Hand already started for table"));
    }
    if error_msg.contains("table_seats.table_id, table_seats.seat_index")
        || error_msg.contains("ux_table_seats_table_seat")
    {
        return Some((ConflictKind::SeatTaken, "Seat already taken"));
    }
    if error_msg.contains("table_seats.table_id, table_seats.player_id")
        || error_msg.contains("ux_table_seats_table_player")
    {
        return Some((
            ConflictKind::PlayerAlreadySeated,
            "Player already seated at table",
        ));
    }
    if error_msg.contains("events.entity_type, events.entity_id, events.entity_version")
        || error_msg.contains("ux_events_entity_version")
        || error_msg.contains("hand_actions.hand_id, hand_actions.seq")
        || error_msg.contains("ux_hand_actions_hand_seq")
    {
        return Some((
            ConflictKind::OptimisticLock,
            "Concurrent write detected; please retry",
        ));
    }
    None
}

fn parse_optimistic_lock(msg: &str) -> DomainError {
    #[derive(serde::Deserialize)]
    struct LockInfo {
        expected: i32,
        actual: i32,
    }

    if let Some(json_str) = msg.strip_prefix(OPTIMISTIC_LOCK_PREFIX) {
        if let Ok(info) = serde_json::from_str::<LockInfo>(json_str) {
            warn!(
                expected = info.expected,
                actual = info.actual,
                "Optimistic lock conflict detected"
            );
            return DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Resource was modified concurrently (expected version {}, actual version {}). Please refresh and retry.",
                    info.expected, info.actual
                ),
            );
        }
    }

    warn!("Optimistic lock conflict detected (version info unavailable)");
    DomainError::conflict(
        ConflictKind::OptimisticLock,
        "Resource was modified by another transaction; please retry",
    )
}

/// Translate a `DbErr` into a `DomainError`.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            let kind = if what.starts_with("Table") {
                NotFoundKind::Table
            } else if what.starts_with("Hand") {
                NotFoundKind::Hand
            } else if what.starts_with("Seat") {
                NotFoundKind::Seat
            } else {
                NotFoundKind::Other("Record".into())
            };
            return DomainError::not_found(kind, what.clone());
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            return parse_optimistic_lock(msg);
        }
        sea_orm::DbErr::Json(msg) => {
            error!(raw_error = %msg, "Stored document failed to decode");
            return DomainError::data_corruption(msg.clone());
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");
        if let Some((kind, detail)) = map_unique_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
