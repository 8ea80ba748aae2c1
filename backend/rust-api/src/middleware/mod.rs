pub mod auth;
pub mod security_headers;

pub use auth::{auth_middleware, AuthUser};
pub use security_headers::security_headers_middleware;
