use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

const LOG_TARGET: &str = "card_room::http";

/// Middleware logging each request and its response status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path();

    match uri.query() {
        None => tracing::info!(target: LOG_TARGET, %method, %path, "incoming request"),
        Some(query) => {
            tracing::info!(target: LOG_TARGET, %method, %path, %query, "incoming request")
        }
    }

    let start = Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        target: LOG_TARGET,
        %method,
        %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
