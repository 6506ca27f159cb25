//! Outbound notification sink. Publishing is best-effort: failures are logged and
//! swallowed so a broken transport never fails a committed mutation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::warn;

use crate::error::AppError;

/// Channel carrying every event for one table.
pub fn table_channel(table_id: i64) -> String {
    format!("table:{table_id}")
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, channel: &str, event_type: &str, payload: &Value);
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn publish(&self, _channel: &str, _event_type: &str, _payload: &Value) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub channel: String,
    pub event_type: String,
    pub payload: Value,
}

/// Records every publish in order; used by tests to observe the outbound stream.
#[derive(Debug, Default)]
pub struct InMemorySink {
    published: Mutex<Vec<Published>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self) -> Vec<Published> {
        self.published.lock().await.clone()
    }

    pub async fn event_types(&self, channel: &str) -> Vec<String> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|p| p.channel == channel)
            .map(|p| p.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn publish(&self, channel: &str, event_type: &str, payload: &Value) {
        self.published.lock().await.push(Published {
            channel: channel.to_string(),
            event_type: event_type.to_string(),
            payload: payload.clone(),
        });
    }
}

const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

/// Redis pub/sub publisher with a short bounded retry on transient failures.
pub struct RedisNotificationSink {
    publisher: Mutex<ConnectionManager>,
}

impl RedisNotificationSink {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| AppError::config(format!("Unable to initialize Redis connection manager: {err}")))?;
        Ok(Self {
            publisher: Mutex::new(manager),
        })
    }

    async fn try_publish(&self, channel: &str, encoded: &str) -> Result<(), redis::RedisError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let res = {
                let mut publisher = self.publisher.lock().await;
                publisher
                    .publish::<_, _, ()>(channel.to_string(), encoded.to_string())
                    .await
            };
            match res {
                Ok(()) => return Ok(()),
                Err(err) if attempt < PUBLISHER_MAX_ATTEMPTS && is_transient(&err) => {
                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "Redis publish failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn is_transient(err: &redis::RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_timeout()
}

#[async_trait]
impl NotificationSink for RedisNotificationSink {
    async fn publish(&self, channel: &str, event_type: &str, payload: &Value) {
        let envelope = serde_json::json!({ "type": event_type, "data": payload });
        let encoded = envelope.to_string();
        if let Err(err) = self.try_publish(channel, &encoded).await {
            warn!(channel, event_type, error = %err, "Dropping notification after publish failure");
        }
    }
}
