//! 인증 endpoint.
//!
//! - `POST /register` - 가입 (201)
//! - `POST /login` - 로그인, 토큰 쌍 발급
//! - `GET /me` - 현재 사용자 정보 (인증 필요)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use usermgmt_core::{Identity, ServiceError};

use super::json_body;
use crate::auth::{
    enforce, AuthUser, LoginOutcome, OptionalAuthUser, RegisterRequest, RouteGuard,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 가입.
///
/// 익명 호출은 기본 역할로만 가입할 수 있습니다. 유효한 토큰이 있으면
/// 호출자의 역할 이하까지 지정할 수 있습니다.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(caller): OptionalAuthUser,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = json_body(payload)?;
    let identity = match caller {
        Some(ctx) => state.authenticator.register_as(&request, ctx.role).await?,
        None => state.authenticator.register(&request).await?,
    };
    Ok((StatusCode::CREATED, Json(identity)))
}

/// 로그인.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginOutcome>> {
    let request = json_body(payload)?;
    let outcome = state
        .authenticator
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(outcome))
}

/// 현재 사용자 정보.
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(ctx): AuthUser,
) -> ApiResult<Json<Identity>> {
    let identity = state
        .store
        .find_by_id(ctx.user_id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(identity))
}

/// 인증 라우터 생성.
pub fn auth_router(state: &AppState) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            RouteGuard::authenticated(state.guard.clone()),
            enforce,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}
