//! Caching layer for routing responses.
//!
//! A plan is keyed by the canonical form of its request, so repeating a
//! search (or toggling back to an earlier one) within the TTL does not hit
//! the routing service again. Earlier/later searches shift the request time
//! and therefore get their own entries.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Plan;
use crate::otp::{OtpError, RoutingRequest, RoutingService};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 256,
        }
    }
}

/// Routing service with caching.
pub struct CachedRoutingClient<S> {
    client: S,
    plans: MokaCache<String, Arc<Plan>>,
}

impl<S: RoutingService + Sync> CachedRoutingClient<S> {
    pub fn new(client: S, config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, plans }
    }

    /// Get a plan, using the cache if available.
    pub async fn get_plan(&self, request: &RoutingRequest) -> Result<Arc<Plan>, OtpError> {
        let key = request.cache_key();

        if let Some(cached) = self.plans.get(&key).await {
            debug!(%key, "routing cache hit");
            return Ok(cached);
        }

        let plan = Arc::new(self.client.plan(request).await?);
        self.plans.insert(key, Arc::clone(&plan)).await;

        Ok(plan)
    }

    /// Access the underlying client for requests that bypass the cache.
    pub fn client(&self) -> &S {
        &self.client
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.plans.invalidate_all();
    }
}

impl<S: RoutingService + Sync> RoutingService for CachedRoutingClient<S> {
    async fn plan(&self, request: &RoutingRequest) -> Result<Plan, OtpError> {
        let plan = self.get_plan(request).await?;
        Ok(Plan::clone(&plan))
    }
}
