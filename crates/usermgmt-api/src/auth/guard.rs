//! 요청 접근 가드.
//!
//! 요청마다 다음 순서로 진행하며, 어느 단계에서든 거부되면 즉시 종료합니다:
//!
//! 1. `Authorization` 헤더 추출 → 없으면 `missing_authorization`
//! 2. `Bearer <token>` 형식 확인 → 아니면 `malformed_header`
//! 3. 토큰 서명/유효기간 검증 → 실패하면 `invalid_or_expired_token`
//! 4. 사용자 ID, 이메일, 역할을 [`AuthContext`]로 구성
//! 5. 요구 역할 집합이 있으면 포함 여부 확인 → 아니면 `insufficient_permissions`
//!
//! 가드는 순수 함수이며 I/O가 없습니다.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use usermgmt_core::{AuthConfig, Role, RoleSet};

use super::jwt::{validate_token_at, Claims};
use crate::metrics;

/// 인증된 요청의 신원 정보.
///
/// 가드를 통과한 요청의 extensions에 삽입되어 핸들러로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// 가드 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardRejection {
    #[error("authorization header is required")]
    MissingAuthorization,
    #[error("authorization header must be 'Bearer <token>'")]
    MalformedHeader,
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("insufficient permissions")]
    InsufficientPermissions,
}

impl GuardRejection {
    /// 기계 판독용 코드.
    pub fn code(&self) -> &'static str {
        match self {
            GuardRejection::MissingAuthorization => "missing_authorization",
            GuardRejection::MalformedHeader => "malformed_header",
            GuardRejection::InvalidOrExpiredToken => "invalid_or_expired_token",
            GuardRejection::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// 인증 실패는 401, 권한 부족은 403.
    pub fn status(&self) -> StatusCode {
        match self {
            GuardRejection::InsufficientPermissions => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// `Bearer <token>` 형식에서 토큰 추출.
///
/// 공백으로 나눈 결과가 정확히 두 개여야 합니다.
pub fn extract_bearer(value: &str) -> Result<&str, GuardRejection> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(GuardRejection::MalformedHeader),
    }
}

/// 요청 접근 가드.
#[derive(Clone)]
pub struct AccessGuard {
    config: Arc<AuthConfig>,
}

impl AccessGuard {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// 헤더 검사 + 역할 확인 (1~5단계).
    pub fn check(
        &self,
        headers: &HeaderMap,
        required: Option<RoleSet>,
    ) -> Result<AuthContext, GuardRejection> {
        self.check_at(headers, required, Utc::now())
    }

    pub(crate) fn check_at(
        &self,
        headers: &HeaderMap,
        required: Option<RoleSet>,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, GuardRejection> {
        let result = self
            .authenticate(headers.get(AUTHORIZATION), now)
            .and_then(|ctx| authorize(&ctx, required).map(|()| ctx));

        if let Err(rejection) = &result {
            debug!(reason = rejection.code(), "Request rejected by access guard");
            metrics::record_guard_rejection(rejection.code());
        }
        result
    }

    /// 인증 (1~4단계).
    fn authenticate(
        &self,
        header: Option<&HeaderValue>,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, GuardRejection> {
        let header = header.ok_or(GuardRejection::MissingAuthorization)?;
        let value = header
            .to_str()
            .map_err(|_| GuardRejection::MalformedHeader)?;
        let token = extract_bearer(value)?;

        let claims = validate_token_at(token, &self.config, now).map_err(|e| {
            debug!(error = %e, "Token validation failed");
            GuardRejection::InvalidOrExpiredToken
        })?;

        Ok(claims.into())
    }
}

/// 역할 확인 (5단계). 요구 집합이 없으면 인증만으로 통과합니다.
pub fn authorize(ctx: &AuthContext, required: Option<RoleSet>) -> Result<(), GuardRejection> {
    match required {
        Some(allowed) if !allowed.contains(ctx.role) => {
            Err(GuardRejection::InsufficientPermissions)
        }
        _ => Ok(()),
    }
}
