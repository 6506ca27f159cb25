//! SeaORM adapter for the append-only event log.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;

use crate::entities::events;

#[derive(Debug, Clone)]
pub struct EventCreate {
    pub entity_type: String,
    pub entity_id: i64,
    pub event_type: String,
    pub payload: Value,
    pub entity_version: i32,
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: EventCreate,
) -> Result<events::Model, sea_orm::DbErr> {
    events::ActiveModel {
        id: NotSet,
        entity_type: Set(dto.entity_type),
        entity_id: Set(dto.entity_id),
        event_type: Set(dto.event_type),
        payload: Set(dto.payload),
        entity_version: Set(dto.entity_version),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// Events after `after_version`, oldest first, at most `limit` rows.
pub async fn find_after_version<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
    after_version: i32,
    limit: u64,
) -> Result<Vec<events::Model>, sea_orm::DbErr> {
    events::Entity::find()
        .filter(events::Column::EntityType.eq(entity_type))
        .filter(events::Column::EntityId.eq(entity_id))
        .filter(events::Column::EntityVersion.gt(after_version))
        .order_by_asc(events::Column::EntityVersion)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn latest_for_entity<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
) -> Result<Option<events::Model>, sea_orm::DbErr> {
    events::Entity::find()
        .filter(events::Column::EntityType.eq(entity_type))
        .filter(events::Column::EntityId.eq(entity_id))
        .order_by_desc(events::Column::EntityVersion)
        .one(conn)
        .await
}

pub async fn count_for_entity<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entity_type: &str,
    entity_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    use sea_orm::PaginatorTrait;

    events::Entity::find()
        .filter(events::Column::EntityType.eq(entity_type))
        .filter(events::Column::EntityId.eq(entity_id))
        .count(conn)
        .await
}
