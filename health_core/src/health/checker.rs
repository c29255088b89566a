//! Reference probe engine

use super::{Checker, FilesystemCheck, HealthCheck, TcpCheck};
use crate::config::AppConfig;
use crate::error::HealthError;
use crate::status::{aggregate, AggregatedCheckStatus, AvailabilityStatus, CheckResult};
use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info, warn};

const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs registered checks and aggregates them.
///
/// Without a periodic interval every [`Checker::check`] call evaluates all checks
/// concurrently. With one, a background task evaluates them on every tick and `check`
/// serves the latest snapshot; checks that have not completed yet report `unknown`.
/// Unless manual start was requested, periodic evaluation begins on the first `check`.
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
    timeout: Duration,
    interval: Option<Duration>,
    manual_start: bool,
    state: Arc<PeriodicState>,
}

#[derive(Default)]
struct PeriodicState {
    results: RwLock<BTreeMap<String, CheckResult>>,
    stop_signal: Mutex<Option<watch::Sender<bool>>>,
    started_once: AtomicBool,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            timeout: DEFAULT_CHECK_TIMEOUT,
            interval: None,
            manual_start: false,
            state: Arc::new(PeriodicState::default()),
        }
    }

    pub fn add_check<T: HealthCheck + 'static>(mut self, check: T) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// Upper bound for a single check execution.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_periodic_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_manual_start(mut self, manual_start: bool) -> Self {
        self.manual_start = manual_start;
        self
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    pub fn is_periodic(&self) -> bool {
        self.interval.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.state.stop_signal.lock().is_some()
    }

    fn snapshot(&self) -> BTreeMap<String, CheckResult> {
        let results = self.state.results.read();
        self.checks
            .iter()
            .map(|check| {
                let result = results
                    .get(check.name())
                    .cloned()
                    .unwrap_or_else(CheckResult::unknown);
                (check.name().to_string(), result)
            })
            .collect()
    }

    /// Spawns the periodic task unless one is running. Returns whether a task was spawned.
    fn spawn_periodic(&self, delay_first_tick: bool) -> bool {
        let Some(interval) = self.interval else {
            debug!("Periodic checks not configured, ignoring start request");
            return false;
        };

        let mut stop_signal = self.state.stop_signal.lock();
        if stop_signal.is_some() {
            return false;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot start periodic health checks outside a Tokio runtime: {}", e);
                return false;
            }
        };

        let (tx, rx) = watch::channel(false);
        *stop_signal = Some(tx);
        self.state.started_once.store(true, Ordering::SeqCst);

        info!(
            "Starting periodic health checks for {} components every {:?}",
            self.checks.len(),
            interval
        );

        let first_tick = if delay_first_tick {
            Instant::now() + interval
        } else {
            Instant::now()
        };

        runtime.spawn(run_periodic(
            self.checks.clone(),
            self.timeout,
            interval,
            first_tick,
            self.state.clone(),
            rx,
        ));

        true
    }

    /// Builds the reference engine from the `health` and `checks` sections.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut checker = HealthChecker::new()
            .with_timeout(config.health.check_timeout())
            .with_manual_start(config.health.manual_start);

        if let Some(interval) = config.health.periodic_interval() {
            checker = checker.with_periodic_interval(interval);
        }

        for target in &config.checks.tcp_targets {
            checker = checker.add_check(TcpCheck::for_address(target.clone()));
        }

        if !config.checks.filesystem_paths.is_empty() {
            checker = checker.add_check(FilesystemCheck::new(config.checks.filesystem_paths.clone()));
        }

        checker
    }
}

#[async_trait::async_trait]
impl Checker for HealthChecker {
    fn start_periodic_checks(&self) {
        self.spawn_periodic(false);
    }

    fn stop_periodic_checks(&self) {
        if let Some(tx) = self.state.stop_signal.lock().take() {
            let _ = tx.send(true);
            info!("Periodic health checks stopping");
        }
    }

    async fn check(&self, include_details: bool) -> AggregatedCheckStatus {
        let results = if self.is_periodic() {
            if !self.manual_start
                && !self.state.started_once.load(Ordering::SeqCst)
                && self.spawn_periodic(true)
            {
                // The task's first tick is one interval away; fill the snapshot now.
                let results = evaluate_all(&self.checks, self.timeout).await;
                store_results(&self.state, results);
            }
            self.snapshot()
        } else {
            evaluate_all(&self.checks, self.timeout).await
        };

        let overall = aggregate(results.values().map(|result| &result.status));
        let status = AggregatedCheckStatus::new(overall).with_checks(results);

        if include_details {
            status
        } else {
            status.without_details()
        }
    }
}

async fn run_periodic(
    checks: Vec<Arc<dyn HealthCheck>>,
    timeout: Duration,
    interval: Duration,
    first_tick: Instant,
    state: Arc<PeriodicState>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let results = evaluate_all(&checks, timeout).await;
                store_results(&state, results);
            }
            _ = stop.changed() => {
                break;
            }
        }
    }

    info!("Periodic health checks stopped");
}

fn store_results(state: &PeriodicState, results: BTreeMap<String, CheckResult>) {
    let mut current = state.results.write();
    for (name, result) in results {
        let previous = current.get(&name).map(|r| r.status);
        if previous != Some(result.status) {
            match result.status {
                AvailabilityStatus::Up => info!("Health check '{}' is up", name),
                _ => warn!(
                    "Health check '{}' changed to {}: {}",
                    name,
                    result.status,
                    result.error.as_deref().unwrap_or("no error reported")
                ),
            }
        }
        current.insert(name, result);
    }
}

async fn evaluate_all(
    checks: &[Arc<dyn HealthCheck>],
    timeout: Duration,
) -> BTreeMap<String, CheckResult> {
    let evaluations = checks.iter().map(|check| async move {
        let result = evaluate(check.as_ref(), timeout).await;
        (check.name().to_string(), result)
    });

    join_all(evaluations).await.into_iter().collect()
}

async fn evaluate(check: &dyn HealthCheck, timeout: Duration) -> CheckResult {
    match tokio::time::timeout(timeout, check.check()).await {
        Ok(Ok(())) => CheckResult::up(),
        Ok(Err(e)) => {
            debug!("Health check '{}' failed: {}", check.name(), e);
            CheckResult::down(e.to_string())
        }
        Err(_) => {
            warn!("Health check '{}' timed out after {:?}", check.name(), timeout);
            CheckResult::down(HealthError::Timeout(timeout).to_string())
        }
    }
}
