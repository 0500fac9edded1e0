use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static::lazy_static! {
    pub static ref PASTES_CREATED: IntCounterVec = register_int_counter_vec!(
        "silly_api_pastes_created_total",
        "Pastes created, by content kind",
        &["kind"]
    ).unwrap();

    pub static ref SECRETS_QUEUED: IntCounter = register_int_counter!(
        "silly_api_secrets_queued_total",
        "Secrets appended to the invalidation log"
    ).unwrap();

    pub static ref COMMIT_ATTEMPTS: IntCounterVec = register_int_counter_vec!(
        "silly_api_commit_attempts_total",
        "Commit-and-push attempts, by outcome",
        &["outcome"]
    ).unwrap();
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap_or_else(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        String::new()
    })
}
