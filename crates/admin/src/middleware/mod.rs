//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (no off-site images, no caching)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler by the [`RequireAdminAuth`] and
//! [`RequireSuperAdmin`] extractors.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, clear_current_admin,
    set_current_admin,
};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
