use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use super::Middleware;
use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// Middleware for collecting request statistics
///
/// Counters are atomics and the per-status table is a `DashMap`, so one
/// instance can observe concurrent requests without a global lock.
///
/// Metrics collected:
/// - Total request count
/// - Completed responses per status code
/// - Requests that failed with an unhandled error
/// - Average latency of completed responses, measured from
///   [`Request::received_at`]
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    completed_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    status_counts: DashMap<u16, usize>,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that entered the chain
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests whose handler error reached the chain unhandled
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Number of completed responses with the given status
    pub fn status_count(&self, status: u16) -> usize {
        self.status_counts.get(&status).map(|c| *c).unwrap_or(0)
    }

    /// Mean time from receipt to completed response; zero before the first one.
    pub fn average_latency(&self) -> Duration {
        let count = self.completed_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Prometheus text exposition of the collected counters
    pub fn render_prometheus(&self) -> String {
        let mut out = format!(
            "# HELP switchyard_requests_total Total number of dispatched requests\n\
             # TYPE switchyard_requests_total counter\n\
             switchyard_requests_total {}\n\
             # HELP switchyard_request_errors_total Requests that failed with an unhandled error\n\
             # TYPE switchyard_request_errors_total counter\n\
             switchyard_request_errors_total {}\n\
             # HELP switchyard_request_latency_seconds Average request latency in seconds\n\
             # TYPE switchyard_request_latency_seconds gauge\n\
             switchyard_request_latency_seconds {}\n\
             # HELP switchyard_responses_total Completed responses by status code\n\
             # TYPE switchyard_responses_total counter\n",
            self.request_count(),
            self.error_count(),
            self.average_latency().as_secs_f64(),
        );
        let mut statuses: Vec<(u16, usize)> = self
            .status_counts
            .iter()
            .map(|e| (*e.key(), *e.value()))
            .collect();
        statuses.sort_unstable();
        for (status, count) in statuses {
            out.push_str(&format!(
                "switchyard_responses_total{{status=\"{status}\"}} {count}\n"
            ));
        }
        out
    }
}

impl Middleware for MetricsMiddleware {
    fn process_request(&self, _req: &Request) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    fn process_response(&self, req: &Request, res: &mut Response) {
        let latency = req.received_at().elapsed();
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        self.completed_count.fetch_add(1, Ordering::Relaxed);
        *self.status_counts.entry(res.status_code).or_insert(0) += 1;
    }

    fn process_error(&self, _req: &Request, _err: &HandlerError) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }
}
