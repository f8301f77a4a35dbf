use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Describe the analysis metrics so they carry help text from the first scrape.
pub fn describe_metrics() {
    metrics::describe_counter!("meal_analyses_total", "Meal analyses started");
    metrics::describe_counter!(
        "meal_analyses_rejected_total",
        "Meal analyses rejected for empty or oversized text"
    );
    metrics::describe_counter!(
        "meal_analyses_failed_total",
        "Meal analyses that failed in extraction or parsing"
    );
    metrics::describe_counter!(
        "meal_items_resolved_total",
        "Extracted foods matched to a table record"
    );
    metrics::describe_counter!(
        "meal_items_unresolved_total",
        "Extracted foods returned with zeroed nutrients"
    );
    metrics::describe_counter!(
        "extraction_lenient_parses_total",
        "Extraction outputs only recovered by lenient parsing"
    );
    metrics::describe_histogram!(
        "meal_analysis_seconds",
        "End-to-end time of a meal analysis"
    );
}

/// GET /metrics — Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}
