//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 경우(테스트 등) 기록은 무시됩니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭
// ============================================================================

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭
// ============================================================================

/// 로그인 시도 결과 (`success`, `invalid_credentials`, `deactivated`).
pub fn record_login(outcome: &'static str) {
    counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

/// 가입 결과 (`success`, `invalid`, `conflict`).
pub fn record_registration(outcome: &'static str) {
    counter!("auth_registrations_total", "outcome" => outcome).increment(1);
}

/// 접근 가드 거부 사유.
pub fn record_guard_rejection(reason: &'static str) {
    counter!("auth_guard_rejections_total", "reason" => reason).increment(1);
}

/// 로그인 후 상태 갱신 실패 (로그인 자체는 성공).
pub fn record_status_update_failure() {
    counter!("auth_status_update_failures_total").increment(1);
}

// ============================================================================
// 경로 정규화
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/api/v1/users/123e4567-e89b-12d3-a456-426614174000/active` → `/api/v1/users/:id/active`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = uuid::Uuid::parse_str(segment).is_ok();
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
