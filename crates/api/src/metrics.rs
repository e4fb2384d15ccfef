//! Request metrics in Prometheus text format.
//!
//! Three families, all labelled by route template and method:
//!
//! - `http_requests_total` (counter)
//! - `http_requests_duration_seconds` (histogram)
//! - `http_response_status_total` (counter, also labelled by `status_code`)

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Upper bounds of the duration histogram, in seconds.
pub const DURATION_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4";

type RouteKey = (String, String);

#[derive(Debug, Clone, Default)]
struct Histogram {
    /// Per-bucket (non-cumulative) counts; the last slot is `+Inf`.
    buckets: [u64; DURATION_BUCKETS.len() + 1],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, seconds: f64) {
        let slot = DURATION_BUCKETS
            .iter()
            .position(|bound| seconds <= *bound)
            .unwrap_or(DURATION_BUCKETS.len());
        self.buckets[slot] += 1;
        self.sum += seconds;
        self.count += 1;
    }
}

#[derive(Debug, Default)]
struct Families {
    requests: BTreeMap<RouteKey, u64>,
    durations: BTreeMap<RouteKey, Histogram>,
    statuses: BTreeMap<(String, String, u16), u64>,
}

/// Process-wide request metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    families: RwLock<Families>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished request.
    pub fn observe(&self, path: &str, method: &str, status: u16, seconds: f64) {
        let mut families = self.families.write().unwrap_or_else(PoisonError::into_inner);
        let key = (path.to_owned(), method.to_owned());

        *families.requests.entry(key.clone()).or_default() += 1;
        families.durations.entry(key).or_default().observe(seconds);
        *families
            .statuses
            .entry((path.to_owned(), method.to_owned(), status))
            .or_default() += 1;
    }

    /// Total requests seen for a route and method.
    pub fn request_count(&self, path: &str, method: &str) -> u64 {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        families
            .requests
            .get(&(path.to_owned(), method.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Render every family in the Prometheus exposition format.
    pub fn render(&self) -> String {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();

        out.push_str("# HELP http_requests_total Total number of HTTP requests.\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for ((path, method), count) in &families.requests {
            let _ = writeln!(out, "http_requests_total{{path=\"{path}\",method=\"{method}\"}} {count}");
        }

        out.push_str("# HELP http_requests_duration_seconds Duration of HTTP requests.\n");
        out.push_str("# TYPE http_requests_duration_seconds histogram\n");
        for ((path, method), hist) in &families.durations {
            let mut cumulative = 0;
            for (bound, count) in DURATION_BUCKETS.iter().zip(hist.buckets.iter()) {
                cumulative += count;
                let _ = writeln!(
                    out,
                    "http_requests_duration_seconds_bucket{{path=\"{path}\",method=\"{method}\",le=\"{bound}\"}} {cumulative}"
                );
            }
            let _ = writeln!(
                out,
                "http_requests_duration_seconds_bucket{{path=\"{path}\",method=\"{method}\",le=\"+Inf\"}} {}",
                hist.count
            );
            let _ = writeln!(
                out,
                "http_requests_duration_seconds_sum{{path=\"{path}\",method=\"{method}\"}} {}",
                hist.sum
            );
            let _ = writeln!(
                out,
                "http_requests_duration_seconds_count{{path=\"{path}\",method=\"{method}\"}} {}",
                hist.count
            );
        }

        out.push_str("# HELP http_response_status_total Responses by status code.\n");
        out.push_str("# TYPE http_response_status_total counter\n");
        for ((path, method, status), count) in &families.statuses {
            let _ = writeln!(
                out,
                "http_response_status_total{{path=\"{path}\",method=\"{method}\",status_code=\"{status}\"}} {count}"
            );
        }

        out
    }
}

/// Middleware recording every request against its route template.
///
/// Unmatched requests share the `unmatched` label so arbitrary paths cannot
/// grow the label set.
pub async fn track(State(metrics): State<Arc<Metrics>>, req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = req.method().as_str().to_owned();

    let start = Instant::now();
    let response = next.run(req).await;
    metrics.observe(&path, &method, response.status().as_u16(), start.elapsed().as_secs_f64());

    response
}

/// GET /metrics
pub async fn export(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    ([(CONTENT_TYPE, CONTENT_TYPE_TEXT)], metrics.render())
}
