//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Request ID (add unique ID to each request)
//! 3. `TraceLayer` (request tracing, span carries the request ID)
//! 4. Visitor lock (one request per session cookie at a time)
//! 5. Session layer (tower-sessions with in-memory store)

pub mod request_id;
pub mod session;

pub use request_id::{RequestId, make_request_span, request_id_middleware};
pub use session::{SessionLocks, create_session_layer, serialize_visitor_requests};
