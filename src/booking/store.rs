//! Session-scoped storage of the in-progress booking draft

use std::sync::Mutex;

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use super::error::GatewayError;

/// Holds at most one serialized draft for one wizard session.
///
/// Records are stored verbatim; parsing belongs to the wizard.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, GatewayError>;
    async fn save(&self, record: String) -> Result<(), GatewayError>;
    async fn clear(&self) -> Result<(), GatewayError>;
}

/// In-process draft store
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    record: Mutex<Option<String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    /// Current record, without consuming it
    pub fn peek(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self) -> Result<Option<String>, GatewayError> {
        Ok(self.slot().clone())
    }

    async fn save(&self, record: String) -> Result<(), GatewayError> {
        *self.slot() = Some(record);
        Ok(())
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Redis-backed draft store, one expiring key per session
#[derive(Clone)]
pub struct RedisDraftStore {
    client: redis::Client,
    key: String,
    ttl_seconds: u64,
}

impl RedisDraftStore {
    pub fn new(url: &str, session_id: &str, ttl_seconds: u64) -> Result<Self, GatewayError> {
        let client = redis::Client::open(url)
            .map_err(|e| GatewayError::Transport(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self {
            client,
            key: format!("booking_draft:{}", session_id),
            ttl_seconds,
        })
    }

    /// Store for a fresh session with a generated ID
    pub fn new_session(url: &str, ttl_seconds: u64) -> Result<Self, GatewayError> {
        Self::new(url, &Uuid::new_v4().to_string(), ttl_seconds)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, GatewayError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl DraftStore for RedisDraftStore {
    async fn load(&self) -> Result<Option<String>, GatewayError> {
        let mut conn = self.connection().await?;
        conn.get(&self.key)
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to read draft from Redis: {}", e)))
    }

    async fn save(&self, record: String) -> Result<(), GatewayError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(&self.key, record, self.ttl_seconds)
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to store draft in Redis: {}", e)))
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(&self.key)
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to delete draft from Redis: {}", e)))
    }
}
