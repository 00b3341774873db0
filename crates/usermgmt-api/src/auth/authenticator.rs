//! 가입/로그인 오케스트레이션.
//!
//! 자격증명 조회 → 계정 상태 확인 → 비밀번호 검증 → 토큰 발급 순으로 진행합니다.
//! 비밀번호 검증이 성공하기 전에는 어떤 상태 변경이나 토큰 발급도 일어나지 않습니다.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use usermgmt_core::{
    AuthConfig, AuthFailure, Identity, NewIdentity, Role, ServiceError, ServiceResult,
    StoreError, UserStore,
};

use super::jwt::{issue_token_pair, TokenPair};
use super::password::{burn_verification, hash_password, verify_password, PasswordError};
use super::validation::{validate_registration, RegisterRequest, ValidatedRegistration};
use crate::metrics;

/// 로그인 성공 결과.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// 로그인한 사용자 (비밀번호 해시 미포함)
    pub user: Identity,
    pub tokens: TokenPair,
}

/// 인증 서비스.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    config: Arc<AuthConfig>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn UserStore>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// 익명 가입. 가장 낮은 역할만 허용됩니다.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation`: 입력 규칙 위반 또는 존재하지 않는 부서
    /// - `ServiceError::Authorization`: 기본보다 높은 역할 요청
    /// - `ServiceError::Conflict`: 이메일 중복 (대소문자 무시)
    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<Identity> {
        self.register_with(request, None).await
    }

    /// 인증된 사용자가 대신 생성하는 가입.
    ///
    /// `actor` 이하의 역할만 부여할 수 있습니다.
    pub async fn register_as(
        &self,
        request: &RegisterRequest,
        actor: Role,
    ) -> ServiceResult<Identity> {
        self.register_with(request, Some(actor)).await
    }

    #[instrument(skip(self, request), fields(email = %request.email, actor = ?actor))]
    async fn register_with(
        &self,
        request: &RegisterRequest,
        actor: Option<Role>,
    ) -> ServiceResult<Identity> {
        let ValidatedRegistration {
            email,
            name,
            password,
            role,
            department_id,
        } = validate_registration(request).inspect_err(|_| {
            metrics::record_registration("invalid");
        })?;

        if !may_assign(actor, role) {
            warn!(requested = %role, "Registration requested a role above the caller's");
            metrics::record_registration("forbidden");
            return Err(ServiceError::Authorization(
                "insufficient permissions to assign role".to_string(),
            ));
        }

        match self.store.find_by_email(&email).await {
            Ok(_) => {
                metrics::record_registration("conflict");
                return Err(ServiceError::conflict("duplicate email"));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(department) = department_id {
            if !self.store.department_exists(department).await? {
                metrics::record_registration("invalid");
                return Err(ServiceError::validation("department does not exist"));
            }
        }

        let password_hash = run_blocking(move || hash_password(&password)).await?;

        let identity = self
            .store
            .create(NewIdentity {
                email,
                name,
                password_hash,
                role,
                department_id,
            })
            .await
            .inspect_err(|e| {
                if matches!(e, StoreError::DuplicateEmail(_)) {
                    metrics::record_registration("conflict");
                }
            })?;

        metrics::record_registration("success");
        info!(user_id = %identity.id, role = %identity.role, "User registered");
        Ok(identity)
    }

    /// 이메일/비밀번호 로그인.
    ///
    /// 이메일이 없을 때와 비밀번호가 틀렸을 때 같은 에러를 반환합니다.
    /// 비활성 계정은 `AccountDeactivated`로 구분됩니다.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Auth(InvalidCredentials)`
    /// - `ServiceError::Auth(AccountDeactivated)`
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let email = Identity::normalize_email(email);

        let mut identity = match self.store.find_by_email(&email).await {
            Ok(identity) => identity,
            Err(StoreError::NotFound) => {
                let password = password.to_string();
                run_blocking(move || {
                    burn_verification(&password);
                    Ok(())
                })
                .await?;
                warn!("Login attempt for non-existent user");
                metrics::record_login("invalid_credentials");
                return Err(AuthFailure::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        if !identity.is_active {
            warn!(user_id = %identity.id, "Login attempt for deactivated account");
            metrics::record_login("deactivated");
            return Err(AuthFailure::AccountDeactivated.into());
        }

        let candidate = password.to_string();
        let stored_hash = identity.password_hash.clone();
        let matches = run_blocking(move || verify_password(&candidate, &stored_hash)).await?;
        if !matches {
            warn!(user_id = %identity.id, "Login attempt with incorrect password");
            metrics::record_login("invalid_credentials");
            return Err(AuthFailure::InvalidCredentials.into());
        }

        identity.mark_online(Utc::now());
        if let Err(e) = self.store.update(&identity).await {
            // 토큰 발급은 계속 진행
            warn!(user_id = %identity.id, error = %e, "Failed to persist login status");
            metrics::record_status_update_failure();
        }

        let tokens = issue_token_pair(identity.id, &identity.email, identity.role, &self.config)
            .map_err(|e| ServiceError::Internal(format!("token issuance failed: {e}")))?;

        metrics::record_login("success");
        info!(user_id = %identity.id, role = %identity.role, "User logged in");
        Ok(LoginOutcome {
            user: identity,
            tokens,
        })
    }
}

/// 역할 부여 가능 여부. 기본 역할은 누구나, 그 이상은 같은 역할 이상인 호출자만.
fn may_assign(actor: Option<Role>, requested: Role) -> bool {
    requested == Role::lowest() || actor.is_some_and(|actor| actor >= requested)
}

/// Argon2 연산을 blocking 스레드에서 실행.
async fn run_blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ServiceError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::repository::InMemoryUserStore;
    use usermgmt_core::PresenceStatus;
    use uuid::Uuid;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn setup() -> (Arc<InMemoryUserStore>, Authenticator) {
        let store = Arc::new(InMemoryUserStore::new());
        let auth = Authenticator::new(store.clone(), Arc::new(AuthConfig::new(TEST_SECRET)));
        (store, auth)
    }

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "A".to_string(),
            password: password.to_string(),
            role: None,
            department_id: None,
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (store, auth) = setup();
        let identity = auth.register(&request("a@b.com", "secret1")).await.unwrap();

        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.role, Role::Employee);
        assert!(identity.is_active);

        let stored = store.find_by_email("a@b.com").await.unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(verify_password("secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_case_insensitive_conflict() {
        let (_, auth) = setup();
        auth.register(&request("A@x.com", "secret1")).await.unwrap();

        let err = auth.register(&request("a@x.com", "secret2")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "duplicate email"));
    }

    #[tokio::test]
    async fn test_anonymous_register_cannot_request_elevated_role() {
        let (store, auth) = setup();
        for role in ["super_admin", "admin", "manager"] {
            let mut req = request("a@b.com", "secret1");
            req.role = Some(role.to_string());

            let err = auth.register(&req).await.unwrap_err();
            assert!(matches!(err, ServiceError::Authorization(_)));
        }
        assert!(store.is_empty().await);

        let mut req = request("a@b.com", "secret1");
        req.role = Some("employee".to_string());
        assert_eq!(auth.register(&req).await.unwrap().role, Role::Employee);
    }

    #[tokio::test]
    async fn test_register_as_limits_role_to_actor() {
        let (_, auth) = setup();

        let mut req = request("m@b.com", "secret1");
        req.role = Some("manager".to_string());
        assert_eq!(auth.register_as(&req, Role::Admin).await.unwrap().role, Role::Manager);

        let mut req = request("s@b.com", "secret1");
        req.role = Some("super_admin".to_string());
        let err = auth.register_as(&req, Role::Admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authorization(_)));

        let identity = auth.register_as(&req, Role::SuperAdmin).await.unwrap();
        assert_eq!(identity.role, Role::SuperAdmin);
    }

    #[test]
    fn test_may_assign() {
        assert!(may_assign(None, Role::Employee));
        assert!(!may_assign(None, Role::Manager));
        assert!(!may_assign(Some(Role::Employee), Role::Manager));
        assert!(may_assign(Some(Role::Manager), Role::Manager));
        assert!(!may_assign(Some(Role::Admin), Role::SuperAdmin));
        assert!(may_assign(Some(Role::SuperAdmin), Role::SuperAdmin));
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let (_, auth) = setup();
        let err = auth.register(&request("not-an-email", "secret1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_unknown_department() {
        let (store, auth) = setup();
        let mut req = request("a@b.com", "secret1");
        req.department_id = Some(Uuid::new_v4());
        let err = auth.register(&req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "department does not exist"));

        let department = Uuid::new_v4();
        store.add_department(department).await;
        req.department_id = Some(department);
        let identity = auth.register(&req).await.unwrap();
        assert_eq!(identity.department_id, Some(department));
    }

    #[tokio::test]
    async fn test_login_success_marks_online() {
        let (store, auth) = setup();
        auth.register(&request("a@b.com", "secret1")).await.unwrap();

        let outcome = auth.login(" A@B.com ", "secret1").await.unwrap();
        assert_eq!(outcome.user.status, PresenceStatus::Online);
        assert!(outcome.user.last_active_at.is_some());
        assert_ne!(outcome.tokens.access_token, outcome.tokens.refresh_token);

        let claims = validate_token(&outcome.tokens.access_token, auth.config()).unwrap();
        assert_eq!(claims.user_id, outcome.user.id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Role::Employee);

        let stored = store.find_by_email("a@b.com").await.unwrap();
        assert_eq!(stored.status, PresenceStatus::Online);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (_, auth) = setup();
        auth.register(&request("a@b.com", "secret1")).await.unwrap();

        let wrong_password = auth.login("a@b.com", "secret2").await.unwrap_err();
        let unknown_email = auth.login("nobody@b.com", "secret1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(
            wrong_password,
            ServiceError::Auth(AuthFailure::InvalidCredentials)
        ));
        assert!(matches!(
            unknown_email,
            ServiceError::Auth(AuthFailure::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_deactivated_account() {
        let (store, auth) = setup();
        let mut identity = auth.register(&request("a@b.com", "secret1")).await.unwrap();
        identity.is_active = false;
        store.update(&identity).await.unwrap();

        let err = auth.login("a@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthFailure::AccountDeactivated)));

        // 상태 변경 없음
        let stored = store.find_by_email("a@b.com").await.unwrap();
        assert_eq!(stored.status, PresenceStatus::Offline);
    }

    #[tokio::test]
    async fn test_wrong_password_does_not_mutate_state() {
        let (store, auth) = setup();
        auth.register(&request("a@b.com", "secret1")).await.unwrap();
        let _ = auth.login("a@b.com", "wrong12").await.unwrap_err();

        let stored = store.find_by_email("a@b.com").await.unwrap();
        assert_eq!(stored.status, PresenceStatus::Offline);
        assert!(stored.last_active_at.is_none());
    }

    #[tokio::test]
    async fn test_status_update_failure_does_not_abort_login() {
        let (store, auth) = setup();
        auth.register(&request("a@b.com", "secret1")).await.unwrap();

        store.fail_updates(true);
        let outcome = auth.login("a@b.com", "secret1").await.unwrap();
        assert!(!outcome.tokens.access_token.is_empty());

        let stored = store.find_by_email("a@b.com").await.unwrap();
        assert_eq!(stored.status, PresenceStatus::Offline);
    }

    #[tokio::test]
    async fn test_login_uses_current_role() {
        let (store, auth) = setup();
        let mut identity = auth.register(&request("a@b.com", "secret1")).await.unwrap();
        identity.role = Role::Manager;
        store.update(&identity).await.unwrap();

        let outcome = auth.login("a@b.com", "secret1").await.unwrap();
        let claims = validate_token(&outcome.tokens.access_token, auth.config()).unwrap();
        assert_eq!(claims.role, Role::Manager);
    }
}
