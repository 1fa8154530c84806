//! Health reporting, metrics counters and tracing initialization for the
//! indexing/retrieval pipeline.

pub mod health;
pub mod metrics;
pub mod tracing;

pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthReport, HealthStatus};
pub use metrics::{InMemoryMetrics, MetricsCollector};
pub use tracing::init_tracing;
