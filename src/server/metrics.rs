use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all MuseMap metrics
const PREFIX: &str = "musemap";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Generation Metrics
    pub static ref GENERATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_generations_total"), "Audio generations by backend and outcome"),
        &["backend", "status"]
    ).expect("Failed to create generations_total metric");

    pub static ref GENERATION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_generation_duration_seconds"),
            "Wall time spent producing one clip"
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["backend"]
    ).expect("Failed to create generation_duration_seconds metric");

    // Theory graph Metrics
    pub static ref GRAPH_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_graph_lookups_total"), "Theory graph lookups by label and result"),
        &["label", "result"]
    ).expect("Failed to create graph_lookups_total metric");

    pub static ref GRAPH_NODES_TOTAL: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_graph_nodes_total"), "Nodes in the theory graph"),
        &["label"]
    ).expect("Failed to create graph_nodes_total metric");

    pub static ref CREATIONS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_creations_total"),
        "Stored creations"
    ).expect("Failed to create creations_total metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(GENERATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GENERATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(GRAPH_LOOKUPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GRAPH_NODES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CREATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Publish node counts of the theory graph, one gauge per label
pub fn init_graph_metrics(counts: &[(&str, usize)]) {
    for (label, count) in counts {
        GRAPH_NODES_TOTAL
            .with_label_values(&[label])
            .set(*count as f64);
    }
    tracing::info!("Graph metrics initialized: {:?}", counts);
}

pub fn set_creations_count(count: usize) {
    CREATIONS_TOTAL.set(count as f64);
}

/// Collapse a request path into a low-cardinality endpoint name
pub fn categorize_endpoint(path: &str) -> &'static str {
    if path.starts_with("/v1/theory") {
        "theory"
    } else if path.starts_with("/v1/context") {
        "context"
    } else if path.starts_with("/v1/generate") {
        "generate"
    } else if path.starts_with("/v1/creations") {
        "creations"
    } else if path.starts_with("/generated_audio") {
        "audio"
    } else if path == "/health" {
        "health"
    } else {
        "other"
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record one generation attempt
pub fn record_generation(backend: &str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "failure" };
    GENERATIONS_TOTAL
        .with_label_values(&[backend, status])
        .inc();

    GENERATION_DURATION_SECONDS
        .with_label_values(&[backend])
        .observe(duration.as_secs_f64());
}

/// Record a graph lookup; `result` is "hit", "miss" or "error"
pub fn record_graph_lookup(label: &str, result: &str) {
    GRAPH_LOOKUPS_TOTAL
        .with_label_values(&[label, result])
        .inc();
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    // RSS is reported in kB
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        if let Ok(kb) = kb_str.parse::<f64>() {
                            PROCESS_MEMORY_BYTES.set(kb * 1024.0);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
