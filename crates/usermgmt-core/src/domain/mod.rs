//! 사용자 관리 도메인 모델.

mod identity;
mod role;
mod store;

pub use identity::{Identity, NewIdentity, PresenceStatus, MAX_EMAIL_LEN};
pub use role::{Role, RoleSet};
pub use store::{StoreError, UserStore};
