//! 설정 관리.
//!
//! 기본값 → 설정 파일(TOML) → 환경 변수(`USERMGMT__*`) 순으로 덮어씁니다.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::ServiceError;

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "USERMGMT";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 인증 설정
    pub auth: AuthConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소 사용
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 설정.
///
/// 서명 키는 `SecretString`으로 보관되어 `Debug` 출력에서 가려집니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC 서명 키
    #[serde(deserialize_with = "deserialize_secret")]
    pub jwt_secret: SecretString,
    /// Access Token 만료 시간 (분)
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: i64,
    /// 토큰 발급자
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_access_ttl() -> i64 {
    15
}
fn default_refresh_ttl() -> i64 {
    7
}
fn default_issuer() -> String {
    "usermgmt".to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

/// 권장 최소 서명 키 길이 (바이트).
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Access Token 최대 만료 시간 (분, 1일).
pub const MAX_ACCESS_TTL_MINUTES: i64 = 24 * 60;

/// Refresh Token 최대 만료 시간 (일).
pub const MAX_REFRESH_TTL_DAYS: i64 = 365;

impl AuthConfig {
    /// 기본 만료 시간과 발급자로 설정 생성.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(secret.into().into()),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            issuer: default_issuer(),
        }
    }

    /// 발급자를 설정합니다.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// 토큰 만료 시간을 설정합니다.
    pub fn with_ttl(mut self, access_minutes: i64, refresh_days: i64) -> Self {
        self.access_token_ttl_minutes = access_minutes;
        self.refresh_token_ttl_days = refresh_days;
        self
    }

    /// 서명 키 바이트.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }

    /// Access Token 만료 시간. 허용 범위 밖의 값은 범위 안으로 잘립니다.
    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_ttl_minutes.clamp(0, MAX_ACCESS_TTL_MINUTES))
    }

    /// Refresh Token 만료 시간. 허용 범위 밖의 값은 범위 안으로 잘립니다.
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days.clamp(0, MAX_REFRESH_TTL_DAYS))
    }

    /// 설정값 검증.
    ///
    /// 빈 서명 키와 허용 범위 밖의 만료 시간은 거부합니다.
    /// 짧은 서명 키는 경고만 남깁니다.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let secret_len = self.jwt_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ServiceError::Config("auth.jwt_secret must not be empty".into()));
        }
        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.access_token_ttl_minutes) {
            return Err(ServiceError::Config(format!(
                "auth.access_token_ttl_minutes must be between 1 and {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if !(1..=MAX_REFRESH_TTL_DAYS).contains(&self.refresh_token_ttl_days) {
            return Err(ServiceError::Config(format!(
                "auth.refresh_token_ttl_days must be between 1 and {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(ServiceError::Config("auth.issuer must not be empty".into()));
        }
        if secret_len < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                secret_len,
                recommended = RECOMMENDED_SECRET_LEN,
                "JWT secret is shorter than recommended"
            );
        }
        Ok(())
    }
}

impl AppConfig {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.connection_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("auth.access_token_ttl_minutes", default_access_ttl())?
            .set_default("auth.refresh_token_ttl_days", default_refresh_ttl())?
            .set_default("auth.issuer", default_issuer())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 환경 변수만으로 로드할 수 있습니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = Self::builder()?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(Self::environment())
            .build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let config = Self::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        config.try_deserialize()
    }
}
