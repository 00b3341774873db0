//! HTTP 요청 metrics middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{normalize_path, record_http_duration, record_http_response};

/// 모든 요청에 대해 응답 수와 처리 시간을 기록하는 미들웨어.
///
/// - `http_responses_total` (method, path, status)
/// - `http_request_duration_seconds` (method, path)
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}
