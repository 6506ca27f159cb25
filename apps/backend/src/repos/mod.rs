//! Repository functions for the domain layer.
//!
//! Each module converts adapter rows into domain models and `DbErr` into `DomainError`.

pub mod actions;
pub mod events;
pub mod hands;
pub mod pots;
pub mod seats;
pub mod showdown;
pub mod tables;

use crate::errors::domain::DomainError;

/// Stored seat columns are SMALLINT; anything outside `u8` means a bad row.
pub(crate) fn seat_from_db(value: i16) -> Result<u8, DomainError> {
    u8::try_from(value)
        .map_err(|_| DomainError::data_corruption(format!("seat index {value} out of range")))
}

pub(crate) fn opt_seat_from_db(value: Option<i16>) -> Result<Option<u8>, DomainError> {
    value.map(seat_from_db).transpose()
}
