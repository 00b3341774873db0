//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 여러 요청 간에 공유됩니다.

use std::sync::Arc;

use axum::extract::FromRef;

use usermgmt_core::{AuthConfig, UserStore};

use crate::auth::{AccessGuard, Authenticator};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소
    pub store: Arc<dyn UserStore>,

    /// 인증 설정 (서명 키, TTL, issuer)
    pub auth_config: Arc<AuthConfig>,

    /// 가입/로그인 오케스트레이터
    pub authenticator: Authenticator,

    /// 요청 접근 가드
    pub guard: AccessGuard,

    /// 데이터베이스 연결 풀 (설정되지 않으면 메모리 저장소 사용)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 같은 `AuthConfig`를 인증기와 가드가 공유하므로 발급과 검증 키가 항상 일치합니다.
    pub fn new(store: Arc<dyn UserStore>, auth_config: AuthConfig) -> Self {
        let auth_config = Arc::new(auth_config);

        Self {
            authenticator: Authenticator::new(store.clone(), auth_config.clone()),
            guard: AccessGuard::new(auth_config.clone()),
            store,
            auth_config,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 풀 설정 (readiness 체크용).
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

impl FromRef<Arc<AppState>> for AccessGuard {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.guard.clone()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 메모리 저장소와 고정 서명 키를 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use crate::repository::InMemoryUserStore;

    AppState::new(
        Arc::new(InMemoryUserStore::new()),
        AuthConfig::new("test-secret-key-for-jwt-testing-minimum-32-chars"),
    )
}
