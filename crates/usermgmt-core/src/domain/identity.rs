//! 사용자 신원(Identity) 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// 이메일 최대 길이.
pub const MAX_EMAIL_LEN: usize = 255;

/// 사용자 접속 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Busy,
    Away,
    #[default]
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Busy => "busy",
            PresenceStatus::Away => "away",
            PresenceStatus::Offline => "offline",
        }
    }

    /// 문자열에서 상태 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "online" => Some(PresenceStatus::Online),
            "busy" => Some(PresenceStatus::Busy),
            "away" => Some(PresenceStatus::Away),
            "offline" => Some(PresenceStatus::Offline),
            _ => None,
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 저장된 사용자 신원.
///
/// `password_hash`는 직렬화되지 않으므로 API 응답에 노출되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// 고유 식별자
    pub id: Uuid,
    /// 이메일 (소문자 정규화, 유일)
    pub email: String,
    /// 표시 이름
    pub name: String,
    /// 단방향 비밀번호 해시 (PHC 문자열)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 사용자 역할
    pub role: Role,
    /// 계정 활성화 여부. false면 로그인할 수 없음
    pub is_active: bool,
    /// 접속 상태
    pub status: PresenceStatus,
    /// 마지막 활동 시각
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
    /// 소속 부서
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// 이메일 정규화 (앞뒤 공백 제거 + 소문자).
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// 로그인 직후 상태 갱신: 온라인 + 마지막 활동 시각 기록.
    pub fn mark_online(&mut self, now: DateTime<Utc>) {
        self.status = PresenceStatus::Online;
        self.last_active_at = Some(now);
        self.updated_at = now;
    }
}

/// 생성할 사용자 입력.
///
/// 식별자와 타임스탬프는 저장소가 부여합니다.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
}

impl NewIdentity {
    /// 저장소가 부여한 식별자/시각으로 `Identity` 구성.
    ///
    /// 새 계정은 활성 상태, 오프라인으로 시작합니다.
    pub fn into_identity(self, id: Uuid, now: DateTime<Utc>) -> Identity {
        Identity {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: self.role,
            is_active: true,
            status: PresenceStatus::Offline,
            last_active_at: None,
            department_id: self.department_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Identity {
        NewIdentity {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$v=19$hash".to_string(),
            role: Role::Employee,
            department_id: None,
        }
        .into_identity(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(Identity::normalize_email("  A@X.Com "), "a@x.com");
        assert_eq!(Identity::normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_new_identity_defaults() {
        let identity = sample();
        assert!(identity.is_active);
        assert_eq!(identity.status, PresenceStatus::Offline);
        assert!(identity.last_active_at.is_none());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""role":"employee""#));
        assert!(json.contains(r#""status":"offline""#));
    }

    #[test]
    fn test_mark_online() {
        let mut identity = sample();
        let now = Utc::now();
        identity.mark_online(now);
        assert_eq!(identity.status, PresenceStatus::Online);
        assert_eq!(identity.last_active_at, Some(now));
    }

    #[test]
    fn test_presence_status_parse() {
        assert_eq!(PresenceStatus::parse("BUSY"), Some(PresenceStatus::Busy));
        assert_eq!(PresenceStatus::parse("away"), Some(PresenceStatus::Away));
        assert_eq!(PresenceStatus::parse("sleeping"), None);
    }
}
