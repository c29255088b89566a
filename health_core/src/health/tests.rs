#[cfg(test)]
mod tests {
    use crate::error::HealthError;
    use crate::health::{Checker, FilesystemCheck, FnCheck, HealthCheck, HealthChecker, TcpCheck};
    use crate::status::AvailabilityStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct SlowCheck;

    #[async_trait::async_trait]
    impl HealthCheck for SlowCheck {
        async fn check(&self) -> crate::Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn counting_check(name: &str, counter: Arc<AtomicUsize>) -> FnCheck {
        FnCheck::new(name, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_fn_check() {
        let ok = FnCheck::new("ok", || Ok(()));
        assert!(ok.check().await.is_ok());
        assert_eq!(ok.name(), "ok");

        let failing = FnCheck::new("failing", || Err(HealthError::check_failed("unavailable")));
        let err = failing.check().await.unwrap_err();
        assert_eq!(err.to_string(), "unavailable");
    }

    #[tokio::test]
    async fn test_filesystem_check() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().to_path_buf();
        let missing = temp_dir.path().join("does-not-exist");

        let check = FilesystemCheck::new(vec![existing.clone()]);
        assert!(check.check().await.is_ok());
        assert_eq!(check.name(), "filesystem");

        let check = FilesystemCheck::new(vec![existing, missing]);
        let err = check.check().await.unwrap_err();
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[tokio::test]
    async fn test_tcp_check() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let check = TcpCheck::for_address(address.clone());
        assert_eq!(check.name(), format!("tcp:{}", address));
        assert!(check.check().await.is_ok());

        drop(listener);
        let check = TcpCheck::new("closed", address);
        assert!(check.check().await.is_err());
    }

    #[tokio::test]
    async fn test_no_checks_is_up() {
        let checker = HealthChecker::new();
        let status = checker.check(true).await;

        assert_eq!(status.status, AvailabilityStatus::Up);
        assert!(status.checks.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_demand_aggregation() {
        let checker = HealthChecker::new()
            .add_check(FnCheck::new("cache", || Ok(())))
            .add_check(FnCheck::new("db", || Err(HealthError::check_failed("connection refused"))));

        let status = checker.check(true).await;
        assert_eq!(status.status, AvailabilityStatus::Down);

        let checks = status.checks.unwrap();
        assert_eq!(checks["cache"].status, AvailabilityStatus::Up);
        assert_eq!(checks["db"].status, AvailabilityStatus::Down);
        assert_eq!(checks["db"].error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_details_omitted_when_not_requested() {
        let checker = HealthChecker::new().add_check(FnCheck::new("db", || Ok(())));

        let status = checker.check(false).await;
        assert_eq!(status.status, AvailabilityStatus::Up);
        assert!(status.checks.is_none());
    }

    #[tokio::test]
    async fn test_check_timeout_marks_down() {
        let checker = HealthChecker::new()
            .add_check(SlowCheck)
            .with_timeout(Duration::from_millis(20));

        let status = checker.check(true).await;
        assert_eq!(status.status, AvailabilityStatus::Down);

        let checks = status.checks.unwrap();
        assert_eq!(checks["slow"].error.as_deref(), Some("check timed out after 20ms"));
    }

    #[tokio::test]
    async fn test_start_is_noop_without_interval() {
        let checker = HealthChecker::new().add_check(FnCheck::new("db", || Ok(())));

        checker.start_periodic_checks();
        assert!(!checker.is_running());
        checker.stop_periodic_checks();
    }

    #[tokio::test]
    async fn test_manual_start_reports_unknown_until_started() {
        let counter = Arc::new(AtomicUsize::new(0));
        let checker = HealthChecker::new()
            .add_check(counting_check("db", counter.clone()))
            .with_periodic_interval(Duration::from_millis(10))
            .with_manual_start(true);

        let status = checker.check(true).await;
        assert_eq!(status.status, AvailabilityStatus::Unknown);
        assert_eq!(status.checks.unwrap()["db"].status, AvailabilityStatus::Unknown);
        assert!(!checker.is_running());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        checker.start_periodic_checks();
        assert!(checker.is_running());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = checker.check(true).await;
        assert_eq!(status.status, AvailabilityStatus::Up);
        assert!(counter.load(Ordering::SeqCst) >= 1);

        checker.stop_periodic_checks();
        assert!(!checker.is_running());
    }

    #[tokio::test]
    async fn test_first_check_starts_periodic_mode() {
        let counter = Arc::new(AtomicUsize::new(0));
        let checker = HealthChecker::new()
            .add_check(counting_check("db", counter.clone()))
            .with_periodic_interval(Duration::from_secs(3600));

        assert!(!checker.is_running());
        let status = checker.check(true).await;
        assert!(checker.is_running());

        // The first caller sees real results rather than an unknown snapshot.
        assert_eq!(status.status, AvailabilityStatus::Up);
        assert_eq!(status.checks.unwrap()["db"].status, AvailabilityStatus::Up);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // The background task waits a full interval before its first run.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let status = checker.check(false).await;
        assert_eq!(status.status, AvailabilityStatus::Up);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        checker.stop_periodic_checks();
    }

    #[tokio::test]
    async fn test_double_start_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let checker = HealthChecker::new()
            .add_check(counting_check("db", counter.clone()))
            .with_periodic_interval(Duration::from_secs(3600))
            .with_manual_start(true);

        checker.start_periodic_checks();
        checker.start_periodic_checks();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // One task means exactly one immediate first tick.
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(checker.is_running());

        checker.stop_periodic_checks();
        checker.stop_periodic_checks();
        assert!(!checker.is_running());
    }

    #[tokio::test]
    async fn test_stop_halts_evaluation() {
        let counter = Arc::new(AtomicUsize::new(0));
        let checker = HealthChecker::new()
            .add_check(counting_check("db", counter.clone()))
            .with_periodic_interval(Duration::from_millis(10))
            .with_manual_start(true);

        checker.start_periodic_checks();
        tokio::time::sleep(Duration::from_millis(60)).await;
        checker.stop_periodic_checks();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let after_stop = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);

        // An explicit stop is not undone by later requests.
        checker.check(true).await;
        assert!(!checker.is_running());
    }
}
