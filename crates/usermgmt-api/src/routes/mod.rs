//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 가입, 로그인, 내 정보
//! - `/api/v1/users` - 사용자 관리 (관리자 전용)

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest};
pub use health::{health_router, ComponentStatus, HealthResponse};
pub use users::{users_router, SetActiveRequest, UsersListResponse};

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json, Router};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보호된 라우트 그룹은 상태의 [`AccessGuard`](crate::auth::AccessGuard)로 가드 레이어를 구성합니다.
pub fn create_api_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router(state))
        .nest("/api/v1/users", users_router(state))
}

/// JSON 본문 추출 실패를 공통 에러 포맷으로 변환.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )
    })
}
