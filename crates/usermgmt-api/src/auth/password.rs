//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 단방향 해싱 및 검증. 작업 비용은 고정 파라미터로 묶여 있으며,
//! 해시 문자열(PHC 형식)에 파라미터와 솔트가 함께 저장됩니다.

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// 메모리 비용 (KiB).
const MEMORY_COST_KIB: u32 = 19_456;
/// 반복 횟수.
const ITERATIONS: u32 = 2;
/// 병렬도.
const PARALLELISM: u32 = 1;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|_| PasswordError::HashingFailed)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 비밀번호 해싱.
///
/// 매 호출마다 새 솔트를 생성하므로 같은 비밀번호도 다른 해시가 됩니다.
/// 엔트로피 소스 실패 등 치명적인 경우에만 에러를 반환합니다.
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password")?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 불일치는 `Ok(false)`입니다. 비교는 상수 시간으로 수행됩니다.
/// 해시 문자열이 구조적으로 잘못된 경우에만 `InvalidHashFormat`을 반환합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // 파라미터는 해시 문자열에서 읽습니다.
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(PasswordError::InvalidHashFormat),
    }
}

/// 존재하지 않는 이메일로 로그인할 때 검증에 사용하는 해시.
///
/// 실제 검증과 응답 시간을 맞춰 계정 존재 여부가 드러나지 않게 합니다.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("usermgmt-timing-equalizer").ok());

/// 더미 해시로 검증을 수행하고 결과를 버립니다.
pub(crate) fn burn_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        if let Err(e) = verify_password(password, hash) {
            tracing::warn!(error = %e, "dummy hash verification failed unexpectedly");
        }
    }
}
