//! 가입 입력 검증.
//!
//! 규칙은 정해진 순서대로 검사하며, 처음 위반한 규칙 하나만 보고합니다.
//! 순서: 이메일 → 이름 → 비밀번호 → 역할.

use serde::Deserialize;
use uuid::Uuid;
use validator::ValidateEmail;

use usermgmt_core::{Identity, Role, ServiceError, MAX_EMAIL_LEN};

/// 비밀번호 최소 길이 (문자 수).
pub const MIN_PASSWORD_LEN: usize = 6;
/// 비밀번호 최대 길이 (문자 수).
pub const MAX_PASSWORD_LEN: usize = 100;
/// 이 길이 이상이면 숫자 또는 기호가 필요합니다.
const COMPLEXITY_THRESHOLD: usize = 8;
/// 표시 이름 최대 길이.
pub const MAX_NAME_LEN: usize = 255;

/// 너무 흔해서 거부하는 비밀번호 (대소문자 무시, 완전 일치).
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "passw0rd",
    "123456",
    "12345678",
    "123456789",
    "qwerty",
    "qwerty123",
    "abc123",
    "abcdef",
    "111111",
    "letmein",
    "welcome",
    "welcome1",
    "admin123",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "changeme",
];

/// 가입 요청.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// 역할 (비어 있으면 가장 낮은 권한)
    #[serde(default)]
    pub role: Option<String>,
    /// 소속 부서
    #[serde(default)]
    pub department_id: Option<Uuid>,
}

/// 검증을 통과한 가입 입력.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    /// 정규화된 이메일
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
}

/// 가입 요청 검증.
pub fn validate_registration(
    request: &RegisterRequest,
) -> Result<ValidatedRegistration, ServiceError> {
    let email = Identity::normalize_email(&request.email);
    validate_email(&email)?;

    let name = request.name.trim();
    validate_name(name)?;

    validate_password(&request.password)?;
    let role = validate_role(request.role.as_deref())?;

    Ok(ValidatedRegistration {
        email,
        name: name.to_string(),
        password: request.password.clone(),
        role,
        department_id: request.department_id,
    })
}

/// 이메일 형식 검증 (`local@domain.tld`).
pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ServiceError::validation(format!(
            "email must be at most {} characters",
            MAX_EMAIL_LEN
        )));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => {
            return Err(ServiceError::validation(
                "email must contain exactly one '@'",
            ))
        }
    };
    if local.is_empty() || domain.is_empty() {
        return Err(ServiceError::validation("email is not a valid address"));
    }

    let has_tld = domain
        .rsplit_once('.')
        .map(|(host, tld)| !host.is_empty() && tld.len() >= 2 && tld.chars().all(char::is_alphabetic))
        .unwrap_or(false);
    if !has_tld || domain.split('.').any(str::is_empty) || !email.to_string().validate_email() {
        return Err(ServiceError::validation("email is not a valid address"));
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// 비밀번호 강도 검증.
///
/// - 6~100자
/// - 흔한 비밀번호 거부
/// - 영문자 1개 이상
/// - 8자 이상이면 숫자 또는 기호 1개 이상
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(ServiceError::validation(format!(
            "password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(ServiceError::validation("password is too common"));
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err(ServiceError::validation(
            "password must contain at least one letter",
        ));
    }

    if len >= COMPLEXITY_THRESHOLD && !password.chars().any(|c| !c.is_alphabetic()) {
        return Err(ServiceError::validation(
            "password of 8 or more characters must contain a digit or symbol",
        ));
    }

    Ok(())
}

/// 역할 검증. 비어 있으면 가장 낮은 권한.
pub fn validate_role(role: Option<&str>) -> Result<Role, ServiceError> {
    match role.map(str::trim) {
        None | Some("") => Ok(Role::lowest()),
        Some(value) => Role::parse(value).ok_or_else(|| {
            ServiceError::validation(
                "role must be one of super_admin, admin, manager, employee",
            )
        }),
    }
}
