//! Axum용 접근 가드 미들웨어 및 추출기.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use usermgmt_core::RoleSet;

use super::guard::{AccessGuard, AuthContext};
use crate::error::ApiError;

/// 라우트 그룹에 적용되는 가드 설정.
///
/// ```rust,ignore
/// Router::new()
///     .route("/", get(list_users))
///     .route_layer(middleware::from_fn_with_state(
///         RouteGuard::roles(state.guard.clone(), RoleSet::ADMINS),
///         enforce,
///     ))
/// ```
#[derive(Clone)]
pub struct RouteGuard {
    guard: AccessGuard,
    required: Option<RoleSet>,
}

impl RouteGuard {
    /// 인증만 요구 (역할 무관).
    pub fn authenticated(guard: AccessGuard) -> Self {
        Self {
            guard,
            required: None,
        }
    }

    /// 지정한 역할 집합 중 하나를 요구.
    pub fn roles(guard: AccessGuard, required: RoleSet) -> Self {
        Self {
            guard,
            required: Some(required),
        }
    }
}

/// 가드 미들웨어.
///
/// 거부 시 핸들러는 실행되지 않습니다. 통과하면 [`AuthContext`]를
/// 요청 extensions에 넣고 다음 단계로 넘깁니다.
pub async fn enforce(
    State(gate): State<RouteGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = gate.guard.check(request.headers(), gate.required)?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// 인증된 사용자 추출기.
///
/// 가드 미들웨어가 넣어 둔 [`AuthContext`]를 사용하고, 없으면 직접 헤더를 검증합니다.
///
/// ```rust,ignore
/// async fn me(AuthUser(ctx): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AccessGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(AuthUser(ctx.clone()));
        }

        let guard = AccessGuard::from_ref(state);
        Ok(AuthUser(guard.check(&parts.headers, None)?))
    }
}

/// 선택적 인증 추출기.
///
/// 토큰이 있고 유효하면 `Some`, 헤더가 없거나 검증에 실패하면 `None`입니다.
/// 익명 요청도 받는 공개 라우트에서 호출자 권한에 따라 동작을 달리할 때 사용합니다.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    AccessGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }

        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(ctx)) => Ok(OptionalAuthUser(Some(ctx))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}
