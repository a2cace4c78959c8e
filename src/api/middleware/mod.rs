//! API middleware.

mod auth;
mod rate_limit;
mod security_headers;

pub use auth::auth_middleware;
pub use rate_limit::{
    rate_limit_login_middleware, rate_limit_middleware, rate_limit_register_middleware,
};
pub use security_headers::with_security_headers;
