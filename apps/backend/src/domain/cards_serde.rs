//! Versioned storage documents for ordered card sequences and seat sets.
//!
//! Cards are stored as `{"v":1,"cards":["As","Td"]}` and seat sets as
//! `{"v":1,"seats":[0,2,5]}`. Readers reject any other version as corrupt data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cards::Card;
use crate::errors::domain::DomainError;

pub const STORAGE_FORMAT_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CardsDoc {
    v: u8,
    cards: Vec<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SeatsDoc {
    v: u8,
    seats: Vec<u8>,
}

fn check_version(value: &Value, what: &str) -> Result<(), DomainError> {
    match value.get("v").and_then(Value::as_u64) {
        Some(v) if v == u64::from(STORAGE_FORMAT_VERSION) => Ok(()),
        Some(v) => Err(DomainError::data_corruption(format!(
            "unsupported {what} format version {v}"
        ))),
        None => Err(DomainError::data_corruption(format!(
            "{what} document has no format version"
        ))),
    }
}

pub fn encode_cards(cards: &[Card]) -> Value {
    serde_json::json!({
        "v": STORAGE_FORMAT_VERSION,
        "cards": cards.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

pub fn decode_cards(value: &Value) -> Result<Vec<Card>, DomainError> {
    check_version(value, "card sequence")?;
    let doc: CardsDoc = serde_json::from_value(value.clone())
        .map_err(|e| DomainError::data_corruption(format!("card sequence: {e}")))?;
    Ok(doc.cards)
}

pub fn encode_seats(seats: &BTreeSet<u8>) -> Value {
    serde_json::json!({
        "v": STORAGE_FORMAT_VERSION,
        "seats": seats.iter().copied().collect::<Vec<_>>(),
    })
}

pub fn decode_seats(value: &Value) -> Result<BTreeSet<u8>, DomainError> {
    check_version(value, "seat set")?;
    let doc: SeatsDoc = serde_json::from_value(value.clone())
        .map_err(|e| DomainError::data_corruption(format!("seat set: {e}")))?;
    Ok(doc.seats.into_iter().collect())
}
