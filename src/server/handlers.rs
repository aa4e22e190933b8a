use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{Instrument, info_span, warn};

use crate::metrics::{Metric, MetricContext, Series};
use crate::request::QueryRequest;

pub(super) async fn health() -> &'static str {
    "OK"
}

pub(super) async fn search() -> Json<Vec<&'static str>> {
    Json(Metric::names())
}

/// Compute every supported target concurrently; series keep target order.
pub(super) async fn query(
    State(ctx): State<Arc<MetricContext>>,
    Json(request): Json<QueryRequest>,
) -> Json<Vec<Series>> {
    let window = request.window(Utc::now());
    let span = info_span!(
        "query",
        request_id = request.correlation_id().unwrap_or("-"),
        targets = request.targets.len()
    );

    let mut tasks: JoinSet<(usize, Series)> = JoinSet::new();
    for (idx, target) in request.targets.iter().enumerate() {
        let Some(metric) = Metric::resolve(&target.target) else {
            continue;
        };
        let ctx = Arc::clone(&ctx);
        let window = window.clone();
        tasks.spawn(
            async move { (idx, metric.compute(&ctx, &window).await) }.instrument(span.clone()),
        );
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(err) => warn!(parent: &span, error = %err, "metric task failed"),
        }
    }
    results.sort_by_key(|(idx, _)| *idx);
    Json(results.into_iter().map(|(_, series)| series).collect())
}
