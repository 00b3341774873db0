//! 역할 기반 접근 제어 (RBAC).
//!
//! 권한 순서가 있는 사용자 역할과 역할 집합 정의.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 사용자 역할.
///
/// 권한 순서는 `SuperAdmin > Admin > Manager > Employee` 입니다.
/// 파싱 이후에는 네 가지 값 외의 역할이 존재할 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 최고 관리자 - 모든 권한 보유
    SuperAdmin,
    /// 관리자 - 사용자 관리 권한
    Admin,
    /// 매니저 - 부서 단위 관리 권한
    Manager,
    /// 일반 직원 - 최소 권한
    Employee,
}

impl Role {
    /// 모든 역할 (권한 높은 순).
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Manager, Role::Employee];

    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::Admin => 75,
            Role::Manager => 50,
            Role::Employee => 10,
        }
    }

    /// 가장 낮은 권한의 역할. 역할 미지정 가입 시 기본값.
    pub fn lowest() -> Self {
        Role::Employee
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    /// 직렬화에 쓰이는 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// 특정 역할 이상인지 확인.
    pub fn at_least(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    fn bit(&self) -> u8 {
        match self {
            Role::SuperAdmin => 0b0001,
            Role::Admin => 0b0010,
            Role::Manager => 0b0100,
            Role::Employee => 0b1000,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::lowest()
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// 역할 집합.
///
/// 보호된 작업이 허용하는 역할 목록을 나타냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// 빈 집합.
    pub const EMPTY: RoleSet = RoleSet(0);

    /// 관리자 계열 (`super_admin`, `admin`).
    pub const ADMINS: RoleSet = RoleSet(0b0011);

    /// 주어진 역할들로 구성된 집합.
    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, role| set.with(*role))
    }

    /// `minimum` 이상의 권한을 가진 모든 역할.
    pub fn at_least(minimum: Role) -> Self {
        Self::of(
            &Role::ALL
                .iter()
                .copied()
                .filter(|r| r.at_least(minimum))
                .collect::<Vec<_>>(),
        )
    }

    /// 모든 역할.
    pub fn all() -> Self {
        Self::of(&Role::ALL)
    }

    /// 역할을 추가한 새 집합 반환.
    #[must_use]
    pub fn with(self, role: Role) -> Self {
        RoleSet(self.0 | role.bit())
    }

    /// 역할 포함 여부.
    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// 포함된 역할 목록 (권한 높은 순).
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.iter().copied().filter(|r| self.contains(*r)).collect()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.roles().iter().map(Role::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
