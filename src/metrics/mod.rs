use lazy_static::lazy_static;
/// Prometheus Metrics
/// Application monitoring and observability
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total HTTP requests"),
        &["endpoint", "status"]
    ).unwrap();

    /// Batch analyses performed
    pub static ref ANALYSES_TOTAL: Counter = Counter::new(
        "analyses_total",
        "Total batch analyses performed"
    ).unwrap();

    /// Transactions analyzed
    pub static ref TRANSACTIONS_ANALYZED: Counter = Counter::new(
        "transactions_analyzed_total",
        "Total transactions run through the pipeline"
    ).unwrap();

    /// Pipeline duration
    pub static ref ANALYSIS_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("analysis_duration_seconds", "Pipeline wall time")
            .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])
    ).unwrap();

    /// Fraud rings per batch
    pub static ref RINGS_DETECTED: Histogram = Histogram::with_opts(
        HistogramOpts::new("fraud_rings_detected", "Fraud rings found per batch")
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0])
    ).unwrap();
}

/// Initialize metrics registry
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    REGISTRY.register(Box::new(ANALYSES_TOTAL.clone())).unwrap();
    REGISTRY
        .register(Box::new(TRANSACTIONS_ANALYZED.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(ANALYSIS_DURATION.clone()))
        .unwrap();
    REGISTRY.register(Box::new(RINGS_DETECTED.clone())).unwrap();
}

/// Get metrics in Prometheus format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record one completed pipeline run.
pub fn observe_analysis(transactions: usize, rings: usize, seconds: f64) {
    ANALYSES_TOTAL.inc();
    TRANSACTIONS_ANALYZED.inc_by(transactions as f64);
    ANALYSIS_DURATION.observe(seconds);
    RINGS_DETECTED.observe(rings as f64);
}
