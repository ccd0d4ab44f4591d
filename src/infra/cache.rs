//! Redis cache implementation.
//!
//! Keys are namespaced by the configured prefix. The cache currently backs
//! token revocation for logout; it is optional and the API runs without it.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::Serialize;
use uuid::Uuid;

use crate::config::CACHE_PREFIX_REVOKED;
use crate::errors::{AppError, AppResult};

/// Redis cache wrapper with a multiplexed connection manager.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    prefix: String,
}

impl Cache {
    /// Connect to Redis, returning the error instead of panicking.
    pub async fn try_connect(redis_url: &str, prefix: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Set a JSON value with a TTL in seconds.
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(self.key(key), json, ttl_seconds.max(1))
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(self.key(key)).await.map_err(cache_error)?;
        Ok(exists)
    }

    /// Round-trip a PING.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Token Revocation
    // =========================================================================

    /// Mark a token id as revoked until it would have expired anyway.
    pub async fn revoke_token(&self, token_id: Uuid, ttl_seconds: u64) -> AppResult<()> {
        self.set_with_ttl(&revoked_key(token_id), &true, ttl_seconds)
            .await
    }

    pub async fn is_token_revoked(&self, token_id: Uuid) -> AppResult<bool> {
        self.exists(&revoked_key(token_id)).await
    }
}

fn revoked_key(token_id: Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_REVOKED, token_id)
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
