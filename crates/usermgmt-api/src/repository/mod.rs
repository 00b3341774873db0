//! Repository pattern for user storage.
//!
//! [`UserStore`] 구현체를 제공합니다.
//! 데이터베이스가 설정되지 않은 환경(개발/테스트)에서는 메모리 저장소를 사용합니다.

pub mod memory;
pub mod users;

pub use memory::InMemoryUserStore;
pub use users::{PgUserStore, UserRecord};

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use usermgmt_core::{DatabaseConfig, StoreError, UserStore};

/// 설정에 맞는 저장소 생성.
///
/// URL이 없으면 메모리 저장소를 사용합니다 (개발 모드).
/// URL이 설정된 경우 연결이나 마이그레이션 실패는 에러로 반환되며
/// 메모리 저장소로 대체하지 않습니다.
pub async fn connect_store(
    config: &DatabaseConfig,
) -> Result<(Arc<dyn UserStore>, Option<sqlx::PgPool>), StoreError> {
    let Some(url) = config.url.as_deref() else {
        warn!("Database URL not configured, using in-memory user store");
        return Ok((Arc::new(InMemoryUserStore::new()), None));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to connect to database: {e}")))?;

    let store = PgUserStore::new(pool.clone());
    store.migrate().await?;

    info!("Connected to PostgreSQL successfully");
    Ok((Arc::new(store), Some(pool)))
}
