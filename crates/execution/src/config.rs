use std::time::Duration;

/// Execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Overall bound on one placement, retries included
    pub order_timeout: Duration,
    /// Pause between placement attempts
    pub retry_backoff: Duration,
    pub reconcile_interval: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            order_timeout: Duration::from_secs(5),
            retry_backoff: Duration::from_secs(1),
            reconcile_interval: Duration::from_secs(10),
        }
    }
}
