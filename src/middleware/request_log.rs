// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request/response logging middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log every request and its response with the request id and latency.
///
/// Runs inside `SetRequestIdLayer`, so the id header is normally present.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(%method, %path, %request_id, "HTTP-REQUEST");

    let start = Instant::now();
    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    let status = response.status().as_u16();
    if response.status().is_server_error() {
        tracing::error!(%method, %path, %request_id, status, latency_ms, "HTTP-RESPONSE");
    } else {
        tracing::info!(%method, %path, %request_id, status, latency_ms, "HTTP-RESPONSE");
    }

    response
}
