//! Authorization attempt metrics.

use crate::authorizer::Decision;
use prometheus::{exponential_buckets, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing record for one authorizer call.
#[derive(Debug, Clone)]
pub struct AuthorizationEvent {
    pub decision: Decision,
    /// Error message reported by the authorizer, if any.
    pub error: Option<String>,
    pub start: Instant,
    pub finish: Instant,
}

impl AuthorizationEvent {
    pub fn duration(&self) -> Duration {
        self.finish.saturating_duration_since(self.start)
    }

    /// Metric label for the outcome. An allow with an error is still `allowed`.
    pub fn result(&self) -> &'static str {
        match (self.decision, &self.error) {
            (Decision::Allow, _) => "allowed",
            (_, Some(_)) => "error",
            (Decision::Deny, None) => "denied",
            (Decision::NoOpinion, None) => "no-opinion",
        }
    }
}

/// Consumer of authorization timing records.
pub trait AuthorizationMetrics: Send + Sync {
    fn record(&self, event: &AuthorizationEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthorizationMetrics;

impl AuthorizationMetrics for NoopAuthorizationMetrics {
    fn record(&self, _event: &AuthorizationEvent) {}
}

/// Prometheus-backed authorization metrics.
#[derive(Clone)]
pub struct PrometheusAuthorizationMetrics {
    attempts: IntCounterVec,
    duration: HistogramVec,
}

impl PrometheusAuthorizationMetrics {
    /// Create the collectors and register them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let attempts = IntCounterVec::new(
            Opts::new(
                "apiserver_authorization_attempts_total",
                "Counter of authorization attempts broken down by result.",
            ),
            &["result"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "apiserver_authorization_duration_seconds",
                "Authorization duration in seconds broken out by result.",
            )
            .buckets(exponential_buckets(0.001, 2.0, 15)?),
            &["result"],
        )?;

        registry.register(Box::new(attempts.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self { attempts, duration })
    }

    /// Attempts recorded so far for `result`.
    pub fn attempts(&self, result: &str) -> u64 {
        self.attempts.with_label_values(&[result]).get()
    }
}

impl AuthorizationMetrics for PrometheusAuthorizationMetrics {
    fn record(&self, event: &AuthorizationEvent) {
        let result = event.result();
        self.attempts.with_label_values(&[result]).inc();
        self.duration
            .with_label_values(&[result])
            .observe(event.duration().as_secs_f64());
    }
}

/// Error attached to an attempt whose authorizer call never returned.
pub const CANCELLED_ERROR: &str = "authorization cancelled before a decision was made";

/// Records one [`AuthorizationEvent`] when dropped.
///
/// Armed with the start time before the authorizer is called. If the call
/// never completes the recorded event carries [`CANCELLED_ERROR`] and ends
/// at drop time.
pub struct AuthorizationMetricsGuard {
    metrics: Arc<dyn AuthorizationMetrics>,
    start: Instant,
    event: Option<AuthorizationEvent>,
}

impl AuthorizationMetricsGuard {
    pub fn start(metrics: Arc<dyn AuthorizationMetrics>) -> Self {
        Self {
            metrics,
            start: Instant::now(),
            event: None,
        }
    }

    /// Close the timing window with the authorizer's outcome.
    pub fn finish(&mut self, decision: Decision, error: Option<String>) {
        self.event = Some(AuthorizationEvent {
            decision,
            error,
            start: self.start,
            finish: Instant::now(),
        });
    }
}

impl Drop for AuthorizationMetricsGuard {
    fn drop(&mut self) {
        let event = self.event.take().unwrap_or_else(|| AuthorizationEvent {
            decision: Decision::NoOpinion,
            error: Some(CANCELLED_ERROR.to_string()),
            start: self.start,
            finish: Instant::now(),
        });
        self.metrics.record(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn event(decision: Decision, error: Option<&str>) -> AuthorizationEvent {
        let start = Instant::now();
        AuthorizationEvent {
            decision,
            error: error.map(str::to_string),
            start,
            finish: start + Duration::from_millis(3),
        }
    }

    #[test_case(Decision::Allow, None, "allowed" ; "allow")]
    #[test_case(Decision::Allow, Some("eval"), "allowed" ; "allow with error")]
    #[test_case(Decision::Deny, None, "denied" ; "deny")]
    #[test_case(Decision::Deny, Some("eval"), "error" ; "deny with error")]
    #[test_case(Decision::NoOpinion, None, "no-opinion" ; "no opinion")]
    #[test_case(Decision::NoOpinion, Some("eval"), "error" ; "no opinion with error")]
    fn test_result_label(decision: Decision, error: Option<&str>, expected: &str) {
        assert_eq!(event(decision, error).result(), expected);
    }

    #[test]
    fn test_prometheus_records_attempts_and_latency() {
        let registry = Registry::new();
        let metrics = PrometheusAuthorizationMetrics::new(&registry).unwrap();

        metrics.record(&event(Decision::Allow, None));
        metrics.record(&event(Decision::Allow, None));
        metrics.record(&event(Decision::Deny, None));

        assert_eq!(metrics.attempts("allowed"), 2);
        assert_eq!(metrics.attempts("denied"), 1);

        let families = registry.gather();
        let histogram = families
            .iter()
            .find(|f| f.get_name() == "apiserver_authorization_duration_seconds")
            .unwrap();
        let count: u64 = histogram
            .get_metric()
            .iter()
            .map(|m| m.get_histogram().get_sample_count())
            .sum();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        PrometheusAuthorizationMetrics::new(&registry).unwrap();
        assert!(PrometheusAuthorizationMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_guard_records_once_on_drop() {
        let registry = Registry::new();
        let metrics = Arc::new(PrometheusAuthorizationMetrics::new(&registry).unwrap());

        let mut guard = AuthorizationMetricsGuard::start(metrics.clone());
        guard.finish(Decision::NoOpinion, None);
        assert_eq!(metrics.attempts("no-opinion"), 0);
        drop(guard);
        assert_eq!(metrics.attempts("no-opinion"), 1);
        assert_eq!(metrics.attempts("error"), 0);
    }

    #[test]
    fn test_unfinished_guard_records_cancellation() {
        let registry = Registry::new();
        let metrics = Arc::new(PrometheusAuthorizationMetrics::new(&registry).unwrap());

        drop(AuthorizationMetricsGuard::start(metrics.clone()));
        assert_eq!(metrics.attempts("error"), 1);
    }
}
