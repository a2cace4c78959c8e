//! Redis-backed counters for IP rate limiting.
//!
//! Each limited identifier owns a fixed-window counter whose TTL doubles as
//! the retry-after value reported to rejected callers.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client, RedisError};

use crate::config::{Config, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of counting one request against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Requests seen in the current window, this one included
    pub count: u64,
    pub allowed: bool,
    /// Requests left before the limit is hit
    pub remaining: u64,
    /// Seconds until the window resets
    pub retry_after: u64,
}

impl RateLimitDecision {
    /// Evaluate a counter value against `max_requests`. `ttl` is the key's
    /// remaining lifetime as reported by Redis (negative when unknown).
    pub fn evaluate(count: u64, ttl: i64, max_requests: u64, window_seconds: u64) -> Self {
        let retry_after = if ttl > 0 { ttl as u64 } else { window_seconds };
        Self {
            count,
            allowed: count <= max_requests,
            remaining: max_requests.saturating_sub(count),
            retry_after,
        }
    }
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

/// Counter store behind the request limiters.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `identifier` in a fixed window of
    /// `window_seconds`. The window starts with the first request.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision>;

    /// Round-trip a PING.
    async fn ping(&self) -> AppResult<()>;
}

#[async_trait]
impl RateLimitStore for Cache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("EX")
            .arg(window_seconds)
            .arg("NX")
            .ignore()
            .incr(&key, 1)
            .ttl(&key)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(RateLimitDecision::evaluate(count, ttl, max_requests, window_seconds))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
