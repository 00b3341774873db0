//! 인증 코어 및 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Argon2 비밀번호 해싱
//! - JWT 발급/검증 및 역할 기반 접근 가드
//! - 가입/로그인 오케스트레이션
//! - Axum 기반 REST API
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`auth`]: 인증 및 권한 관리
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`repository`]: 사용자 저장소 구현체
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    hash_password, verify_password, AccessGuard, AuthContext, AuthUser, Authenticator, Claims,
    GuardRejection, OptionalAuthUser, TokenPair,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;
