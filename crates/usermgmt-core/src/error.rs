//! 인증 코어의 에러 타입.
//!
//! 모든 실패는 요청 단위 결과로 호출자에게 반환되며, 프로세스를 중단시키지 않습니다.

use thiserror::Error;

use crate::domain::StoreError;

/// 인증 실패 사유.
///
/// 클라이언트에는 사유별로 고정된 일반 메시지만 노출됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// 이메일 없음 또는 비밀번호 불일치 (두 경우 동일한 응답)
    InvalidCredentials,
    /// 비활성화된 계정
    AccountDeactivated,
    /// 토큰 서명/형식/유효기간 검증 실패
    InvalidOrExpiredToken,
}

impl AuthFailure {
    /// 기계 판독용 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::AccountDeactivated => "account_deactivated",
            AuthFailure::InvalidOrExpiredToken => "invalid_or_expired_token",
        }
    }

    /// 클라이언트에 노출되는 메시지.
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "invalid email or password",
            AuthFailure::AccountDeactivated => "account is deactivated",
            AuthFailure::InvalidOrExpiredToken => "invalid or expired token",
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// 서비스 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 잘못된 입력 (첫 번째 위반 규칙)
    #[error("{0}")]
    Validation(String),

    /// 중복 리소스
    #[error("{0}")]
    Conflict(String),

    /// 인증 실패
    #[error("{0}")]
    Auth(AuthFailure),

    /// 역할 부족
    #[error("{0}")]
    Authorization(String),

    /// 대상 없음
    #[error("{0}")]
    NotFound(String),

    /// 비밀번호 해싱 실패
    #[error("해싱 에러: {0}")]
    Hashing(String),

    /// 저장소 에러
    #[error(transparent)]
    Store(StoreError),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    /// 클라이언트 입력을 고쳐서 재시도할 수 있는 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_)
                | ServiceError::Conflict(_)
                | ServiceError::Auth(_)
                | ServiceError::Authorization(_)
                | ServiceError::NotFound(_)
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::NotFound("user not found".to_string()),
            StoreError::DuplicateEmail(_) => {
                ServiceError::Conflict("duplicate email".to_string())
            }
            other => ServiceError::Store(other),
        }
    }
}

impl From<AuthFailure> for ServiceError {
    fn from(failure: AuthFailure) -> Self {
        ServiceError::Auth(failure)
    }
}
