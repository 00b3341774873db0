//! 사용자 관리 endpoint (관리자 전용).
//!
//! - `GET /` - 사용자 목록
//! - `PATCH /{id}/active` - 계정 활성화/비활성화

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use usermgmt_core::{Identity, RoleSet, ServiceError};

use super::json_body;
use crate::auth::{enforce, AuthUser, RouteGuard};
use crate::error::ApiResult;
use crate::state::AppState;

/// 사용자 목록 응답.
#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<Identity>,
    pub total: usize,
}

/// 활성화 상태 변경 요청.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// 사용자 목록.
///
/// GET /api/v1/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<UsersListResponse>> {
    let users = state.store.list().await.map_err(ServiceError::from)?;
    let total = users.len();
    Ok(Json(UsersListResponse { users, total }))
}

/// 계정 활성화/비활성화.
///
/// 자기 자신은 비활성화할 수 없고, 자신보다 높은 역할의 계정은 변경할 수 없습니다.
///
/// PATCH /api/v1/users/{id}/active
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> ApiResult<Json<Identity>> {
    let request = json_body(payload)?;

    if id == ctx.user_id && !request.active {
        return Err(ServiceError::validation("cannot deactivate your own account").into());
    }

    let mut identity = state
        .store
        .find_by_id(id)
        .await
        .map_err(ServiceError::from)?;

    if identity.role > ctx.role {
        return Err(ServiceError::Authorization(
            "cannot modify an account with a higher role".to_string(),
        )
        .into());
    }

    identity.is_active = request.active;
    state
        .store
        .update(&identity)
        .await
        .map_err(ServiceError::from)?;

    info!(
        user_id = %identity.id,
        active = request.active,
        changed_by = %ctx.user_id,
        "Account activation changed"
    );

    Ok(Json(identity))
}

/// 사용자 관리 라우터 생성.
pub fn users_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/active", patch(set_active))
        .route_layer(middleware::from_fn_with_state(
            RouteGuard::roles(state.guard.clone(), RoleSet::ADMINS),
            enforce,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use usermgmt_core::{NewIdentity, Role};

    async fn seed(state: &AppState, email: &str, role: Role) -> (Identity, String) {
        let identity = state
            .store
            .create(NewIdentity {
                email: email.to_string(),
                name: "Seeded".to_string(),
                password_hash: "$argon2id$dummy".to_string(),
                role,
                department_id: None,
            })
            .await
            .unwrap();
        let token = issue_token(
            identity.id,
            &identity.email,
            role,
            Duration::minutes(15),
            &state.auth_config,
        )
        .unwrap();
        (identity, format!("Bearer {token}"))
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .nest("/users", users_router(&state))
            .with_state(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn patch_active(id: Uuid, auth: &str, active: bool) -> Request<Body> {
        Request::builder()
            .method("PATCH")
            .uri(format!("/users/{id}/active"))
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "active": active }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_requires_admin() {
        let state = Arc::new(create_test_state());
        let (_, employee) = seed(&state, "e@example.com", Role::Employee).await;
        let (_, admin) = seed(&state, "a@example.com", Role::Admin).await;

        let request = |auth: &str| {
            Request::builder()
                .uri("/users")
                .header(header::AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(app(state.clone()), request(&employee)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "insufficient_permissions");

        let (status, body) = send(app(state), request(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let state = Arc::new(create_test_state());
        let (target, _) = seed(&state, "e@example.com", Role::Employee).await;
        let (_, admin) = seed(&state, "a@example.com", Role::Admin).await;

        let (status, body) = send(app(state.clone()), patch_active(target.id, &admin, false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], false);
        assert!(!state.store.find_by_id(target.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_cannot_deactivate_self() {
        let state = Arc::new(create_test_state());
        let (admin_user, admin) = seed(&state, "a@example.com", Role::Admin).await;

        let (status, _) = send(app(state), patch_active(admin_user.id, &admin, false)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_cannot_modify_super_admin() {
        let state = Arc::new(create_test_state());
        let (root, _) = seed(&state, "root@example.com", Role::SuperAdmin).await;
        let (_, admin) = seed(&state, "a@example.com", Role::Admin).await;

        let (status, _) = send(app(state), patch_active(root.id, &admin, false)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let state = Arc::new(create_test_state());
        let (_, admin) = seed(&state, "a@example.com", Role::Admin).await;

        let (status, body) = send(app(state), patch_active(Uuid::new_v4(), &admin, true)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }
}
