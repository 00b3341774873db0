//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`password`]: Argon2 비밀번호 해싱/검증
//! - [`jwt`]: Access/Refresh Token 발급 및 검증
//! - [`Authenticator`]: 가입/로그인 오케스트레이션
//! - [`AccessGuard`]: Bearer 토큰 인증 + 역할 확인
//! - [`validation`]: 가입 입력 검증
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! // 보호된 라우트에서 AuthUser 추출기 사용
//! async fn protected_handler(AuthUser(ctx): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", ctx.email)
//! }
//! ```

mod authenticator;
mod guard;
pub mod jwt;
mod middleware;
pub mod password;
pub mod validation;

pub use authenticator::{Authenticator, LoginOutcome};
pub use guard::{authorize, extract_bearer, AccessGuard, AuthContext, GuardRejection};
pub use jwt::{issue_token, issue_token_pair, validate_token, Claims, JwtError, TokenPair};
pub use middleware::{enforce, AuthUser, OptionalAuthUser, RouteGuard};
pub use password::{hash_password, verify_password, PasswordError};
pub use validation::{validate_registration, RegisterRequest, ValidatedRegistration};
