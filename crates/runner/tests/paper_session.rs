//! Paper session integration test
//!
//! Runs the whole system against the simulated exchange on a paused clock:
//! activity -> exchange -> feed -> ledger -> store <- executor <- operator

use hermes_runner::{ConfigError, Error, PaperSession, RunnerConfig};
use std::time::Duration;

fn config() -> RunnerConfig {
    RunnerConfig::from_json(
        r#"{
            "exchange": {"product": "BTC-USD"},
            "ledger": {"depth_levels": 5, "depth_interval_ms": 500},
            "execution": {"order_timeout_ms": 2000, "retry_backoff_ms": 500, "reconcile_interval_ms": 3000},
            "simulation": {"seed": 7, "reject_rate": 0.0, "activity_interval_ms": 100, "duration_secs": 12}
        }"#,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_paper_session_runs_end_to_end() {
    let _ = env_logger::try_init();

    let session = PaperSession::new(config()).unwrap();
    let state = session.state();
    let operator = session.scripted_operator();

    let report = session.run(Some(operator)).await.unwrap();

    assert!(report.activity_ticks > 0);
    assert!(report.ledger.applied > 0);
    assert_eq!(report.ledger.malformed, 0);
    assert!(report.operator_requests >= 1);

    let snapshot = &report.snapshot;
    assert_eq!(snapshot.bids.len(), 5);
    assert_eq!(snapshot.asks.len(), 5);
    assert!(snapshot.trades > 0);
    assert!(snapshot.last_match_price.is_some());
    assert!(!state.status_message().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_session_without_operator_owns_nothing() {
    let session = PaperSession::new(config()).unwrap();
    let state = session.state();

    let report = session
        .run_for(Duration::from_secs(3), None)
        .await
        .unwrap();

    assert_eq!(report.operator_requests, 0);
    assert_eq!(state.owned_order_count(), 0);
    assert!(state.best_bid().is_some());
}

#[test]
fn test_invalid_config_is_refused() {
    let config = RunnerConfig::from_json(r#"{"exchange": {"product": "XRP-EUR"}}"#).unwrap();
    assert!(matches!(
        PaperSession::new(config),
        Err(Error::Config(ConfigError::UnsupportedProduct(_)))
    ));
}
