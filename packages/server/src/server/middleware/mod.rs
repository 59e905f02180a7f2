pub mod jwt_auth;

pub use jwt_auth::{bearer_token, jwt_auth_middleware, require_admin, require_user, AuthUser};
