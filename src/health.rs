// src/health.rs
use serde::Serialize;

use crate::cache::CacheStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub store: StoreStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Process health, conditioned on store reachability. Never panics; an
/// unreachable store degrades the report and nothing else.
pub async fn check(store: &dyn CacheStore) -> HealthReport {
    match store.ping().await {
        Ok(()) => HealthReport {
            status: HealthStatus::Healthy,
            store: StoreStatus::Connected,
        },
        Err(_) => HealthReport {
            status: HealthStatus::Unhealthy,
            store: StoreStatus::Disconnected,
        },
    }
}
