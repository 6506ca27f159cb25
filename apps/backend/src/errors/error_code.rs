//! Error codes for the table engine API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Action is not legal for the seat right now
    IllegalAction,
    /// Amount outside the legal bounds for the action
    InvalidAmount,
    /// Submitted by a seat that is not the current actor
    NotYourTurn,
    /// Submitted at or after the action deadline
    TurnExpired,
    /// No hand is being played at the table
    NoActiveHand,
    InvalidSeat,
    InvalidTableConfig,
    ParseCard,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    TableNotFound,
    HandNotFound,
    SeatNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Optimistic lock conflict
    OptimisticLock,
    SeatTaken,
    PlayerAlreadySeated,
    HandInProgress,
    TableComplete,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    /// Hand phase change outside the transition table
    InvalidStateTransition,
    DataCorruption,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IllegalAction => "ILLEGAL_ACTION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::TurnExpired => "TURN_EXPIRED",
            Self::NoActiveHand => "NO_ACTIVE_HAND",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::InvalidTableConfig => "INVALID_TABLE_CONFIG",
            Self::ParseCard => "PARSE_CARD",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::HandNotFound => "HAND_NOT_FOUND",
            Self::SeatNotFound => "SEAT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::SeatTaken => "SEAT_TAKEN",
            Self::PlayerAlreadySeated => "PLAYER_ALREADY_SEATED",
            Self::HandInProgress => "HAND_IN_PROGRESS",
            Self::TableComplete => "TABLE_COMPLETE",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
