use axum::http::HeaderMap;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

use crate::common::{CoreError, CoreResult, ProfileId};
use crate::domains::auth::JwtService;

/// Authenticated user information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub profile_id: ProfileId,
    pub is_admin: bool,
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds
/// AuthUser to request extensions. If no token or invalid token, request
/// continues without AuthUser; handlers that need auth reject it there.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(
            "Authenticated user: {} (admin: {})",
            user.profile_id, user.is_admin
        );
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Token from the Authorization header, with or without the Bearer prefix.
/// Shared with the SSE endpoint, which also accepts a query-param token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    Some(auth.strip_prefix("Bearer ").unwrap_or(auth).to_string())
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let token = bearer_token(request.headers())?;
    let claims = jwt_service.verify_token(&token).ok()?;

    Some(AuthUser {
        profile_id: ProfileId::from_uuid(claims.profile_id),
        is_admin: claims.is_admin,
    })
}

/// Unwrap the optional AuthUser extension or reject with `NotAuthorized`.
pub fn require_user(user: Option<&AuthUser>) -> CoreResult<AuthUser> {
    user.cloned()
        .ok_or_else(|| CoreError::NotAuthorized("authentication required".to_string()))
}

/// Like [`require_user`] but also demands the admin flag.
pub fn require_admin(user: Option<&AuthUser>) -> CoreResult<AuthUser> {
    let user = require_user(user)?;
    if !user.is_admin {
        return Err(CoreError::NotAuthorized(
            "administrator access required".to_string(),
        ));
    }
    Ok(user)
}
