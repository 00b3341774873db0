//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직. 두 토큰은 같은 클레임 구조와
//! 서명 키를 사용하며 만료 시간만 다릅니다.
//!
//! 서명 알고리즘은 HS256으로 고정되어 있고, 토큰 헤더가 다른 알고리즘을 선언하면
//! 검증에 실패합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use usermgmt_core::{AuthConfig, Role};

/// 고정 서명 알고리즘.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID 문자열
    pub sub: String,
    /// 사용자 ID
    pub user_id: Uuid,
    /// 이메일
    pub email: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Not Before (Unix timestamp)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// `now` 기준으로 `ttl` 동안 유효한 클레임 생성.
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        role: Role,
        ttl: Duration,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            user_id,
            email: email.into(),
            role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.into(),
        }
    }

    /// 유효 구간 `[nbf, exp)` 검사.
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), JwtError> {
        let ts = now.timestamp();
        if ts < self.nbf {
            return Err(JwtError::NotYetValid);
        }
        if ts >= self.exp {
            return Err(JwtError::TokenExpired);
        }
        Ok(())
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// Refresh Token 만료 시간 (초)
    pub refresh_expires_in: i64,
    /// 항상 "Bearer"
    pub token_type: String,
}

/// JWT 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("아직 유효하지 않은 토큰")]
    NotYetValid,
    #[error("서명이 일치하지 않습니다")]
    InvalidSignature,
    #[error("허용되지 않은 서명 알고리즘")]
    AlgorithmMismatch,
    #[error("발급자가 일치하지 않습니다")]
    InvalidIssuer,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
}

/// 토큰 발급.
///
/// `iat = nbf = now`, `exp = now + ttl`, `iss = config.issuer`.
pub fn issue_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    ttl: Duration,
    config: &AuthConfig,
) -> Result<String, JwtError> {
    issue_token_at(user_id, email, role, ttl, config, Utc::now())
}

/// 지정한 시각 기준 토큰 발급.
pub fn issue_token_at(
    user_id: Uuid,
    email: &str,
    role: Role,
    ttl: Duration,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> Result<String, JwtError> {
    let claims = Claims::new(user_id, email, role, ttl, config.issuer.as_str(), now);
    encode(
        &Header::new(SIGNING_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )
    .map_err(JwtError::from)
}

/// 같은 사용자 스냅샷으로 Access/Refresh Token 쌍 발급.
pub fn issue_token_pair(
    user_id: Uuid,
    email: &str,
    role: Role,
    config: &AuthConfig,
) -> Result<TokenPair, JwtError> {
    let now = Utc::now();
    let access_ttl = config.access_token_ttl();
    let refresh_ttl = config.refresh_token_ttl();

    let access_token = issue_token_at(user_id, email, role, access_ttl, config, now)?;
    let refresh_token = issue_token_at(user_id, email, role, refresh_ttl, config, now)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_in: access_ttl.num_seconds(),
        refresh_expires_in: refresh_ttl.num_seconds(),
        token_type: "Bearer".to_string(),
    })
}

/// 토큰 디코딩 및 검증.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims, JwtError> {
    validate_token_at(token, config, Utc::now())
}

/// 지정한 시각 기준 토큰 검증.
///
/// 서명, 알고리즘, 발급자는 jsonwebtoken이 확인하고 유효 구간은
/// `now`로 직접 확인합니다.
pub fn validate_token_at(
    token: &str,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => JwtError::AlgorithmMismatch,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::ImmatureSignature => JwtError::NotYetValid,
        _ => JwtError::InvalidToken,
    })?;

    data.claims.check_window(now)?;
    Ok(data.claims)
}
