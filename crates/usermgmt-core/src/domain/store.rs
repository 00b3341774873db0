//! 외부 사용자 저장소 추상화.
//!
//! 인증 코어는 이 trait를 통해서만 사용자 데이터에 접근합니다.
//! 이메일 유일성은 구현체가 강제해야 하는 제약입니다.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Identity, NewIdentity};

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 대상 사용자 없음
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,

    /// 이메일 유일성 제약 위반
    #[error("이미 사용 중인 이메일입니다: {0}")]
    DuplicateEmail(String),

    /// 저장소 접근 실패
    #[error("저장소 에러: {0}")]
    Unavailable(String),
}

/// 사용자 저장소 trait.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct PgUserStore {
///     pool: PgPool,
/// }
///
/// #[async_trait]
/// impl UserStore for PgUserStore {
///     async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError> {
///         // SELECT ... WHERE email = $1
///     }
///
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 조회. 이메일은 호출자가 정규화해서 전달합니다.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 해당 이메일의 사용자 없음
    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError>;

    /// 식별자로 조회.
    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError>;

    /// 사용자 생성.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateEmail`: 동일 이메일이 이미 존재 (동시 가입 경합 포함)
    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// 변경 가능한 필드 저장.
    async fn update(&self, identity: &Identity) -> Result<(), StoreError>;

    /// 부서 존재 여부 (가입 시 외래 키 확인).
    async fn department_exists(&self, department_id: Uuid) -> Result<bool, StoreError>;

    /// 전체 사용자 목록 (생성 순).
    async fn list(&self) -> Result<Vec<Identity>, StoreError>;
}
