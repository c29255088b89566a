//! Probe engine interface and a reference implementation.
//!
//! The request handler depends only on [`Checker`]. [`HealthChecker`] is the engine the
//! server binary uses: it runs named [`HealthCheck`]s either on demand or periodically
//! in a background task and aggregates them into one [`AggregatedCheckStatus`].

pub mod checker;
pub mod checks;

#[cfg(test)]
mod tests;

use crate::status::AggregatedCheckStatus;

pub use checker::HealthChecker;
pub use checks::{FilesystemCheck, FnCheck, HealthCheck, TcpCheck};

/// Capability the request handler consumes.
///
/// Implementations own their synchronization: all three methods may be called
/// concurrently from any task.
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Begins periodic evaluation. Has no effect if already running.
    fn start_periodic_checks(&self);

    /// Signals periodic evaluation to stop without waiting for it to finish.
    fn stop_periodic_checks(&self);

    /// Produces the aggregated status. With `include_details == false` the result
    /// must not carry per-check detail.
    async fn check(&self, include_details: bool) -> AggregatedCheckStatus;
}
