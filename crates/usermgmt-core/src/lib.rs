//! # User Management Core
//!
//! 사용자 관리 서비스의 핵심 도메인 모델 및 공용 인프라를 제공합니다.
//!
//! 이 크레이트는 인증 코어와 HTTP 계층이 함께 사용하는 기본 타입을 제공합니다:
//! - 사용자 신원(Identity) 및 접속 상태
//! - 권한 순서가 있는 역할(Role) 및 역할 집합(RoleSet)
//! - 외부 사용자 저장소 인터페이스(UserStore)
//! - 설정 관리
//! - 에러 분류 체계
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
