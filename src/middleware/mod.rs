pub mod auth;
pub mod response;
pub mod security_headers;

pub use auth::{extract_bearer_token, require_auth};
pub use response::{json_error_bodies, ApiResponse, ApiResult};
