//! Append-only event log, one gapless version sequence per entity.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::events_sea as events_adapter;
use crate::entities::events;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub event_type: String,
    pub payload: Value,
    pub entity_version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl From<events::Model> for EventRecord {
    fn from(model: events::Model) -> Self {
        Self {
            id: model.id,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            event_type: model.event_type,
            payload: model.payload,
            entity_version: model.entity_version,
            created_at: model.created_at,
        }
    }
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
    event_type: &str,
    payload: Value,
    entity_version: i32,
) -> Result<EventRecord, DomainError> {
    let dto = events_adapter::EventCreate {
        entity_type: entity_type.to_string(),
        entity_id,
        event_type: event_type.to_string(),
        payload,
        entity_version,
    };
    Ok(EventRecord::from(events_adapter::append(conn, dto).await?))
}

pub async fn find_after_version<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
    after_version: i32,
    limit: u64,
) -> Result<Vec<EventRecord>, DomainError> {
    Ok(
        events_adapter::find_after_version(conn, entity_type, entity_id, after_version, limit)
            .await?
            .into_iter()
            .map(EventRecord::from)
            .collect(),
    )
}

pub async fn latest_for_entity<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
) -> Result<Option<EventRecord>, DomainError> {
    Ok(events_adapter::latest_for_entity(conn, entity_type, entity_id)
        .await?
        .map(EventRecord::from))
}

pub async fn count_for_entity<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
) -> Result<u64, DomainError> {
    Ok(events_adapter::count_for_entity(conn, entity_type, entity_id).await?)
}
