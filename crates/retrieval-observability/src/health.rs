//! Health reporting for the indexing/retrieval pipeline, surfaced by the
//! CLI's `status` command (SPEC_FULL §6.1).

use async_trait::async_trait;
use retrieval_core::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Result of checking one dependency (the engine, the record of truth, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

/// Aggregate report across all registered components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub uptime_seconds: f64,
    pub version: String,
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> ComponentHealth;

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

/// Coordinates a set of [`HealthCheck`]s and folds their results into a
/// single [`HealthReport`] (worst status wins).
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
    start_time: Instant,
    version: String,
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            start_time: Instant::now(),
            version: version.into(),
        }
    }

    pub fn add_check(&mut self, check: Arc<dyn HealthCheck>) {
        self.checks.push(check);
    }

    pub async fn check_health(&self) -> HealthReport {
        let mut components = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let check_timeout = check.timeout();
            let result = match timeout(check_timeout, check.check()).await {
                Ok(result) => result,
                Err(_) => ComponentHealth {
                    name: check.name().to_string(),
                    status: HealthStatus::Unhealthy,
                    message: format!("health check timed out after {check_timeout:?}"),
                    checked_at: Utc::now(),
                },
            };
            components.push(result);
        }

        let status = components.iter().fold(HealthStatus::Healthy, |acc, c| {
            match (acc, c.status) {
                (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => {
                    HealthStatus::Unhealthy
                }
                (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => {
                    HealthStatus::Degraded
                }
                _ => HealthStatus::Healthy,
            }
        });

        HealthReport {
            status,
            components,
            uptime_seconds: self.start_time.elapsed().as_secs_f64(),
            version: self.version.clone(),
        }
    }
}
