//! HTTP API of the rideout controller
//!
//! Versioned under `/v1`. Handlers receive the authenticated user as
//! [`ReqData`](actix_web::web::ReqData) from the session middleware and do
//! their database work on the blocking thread pool via [`crate::block`].
pub mod v1;
