//! API 서버용 HTTP middleware.
//!
//! 접근 가드 레이어는 [`crate::auth`]에 있습니다.

mod metrics;

pub use metrics::metrics_layer;
