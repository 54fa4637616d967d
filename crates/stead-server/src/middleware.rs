//! Request middleware for the stead server.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::api::ApiError;

/// Header carrying the caller's claimed identity.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The caller's claimed user id, stored in request extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallerIdentity(pub i64);

/// Middleware for routes that need a caller identity.
///
/// # Security Note
///
/// The caller asserts its own identity via the `X-User-Id` header; there is
/// no signature or session validation. This is a development-only trust
/// boundary — a production deployment must swap this middleware for one that
/// verifies a real credential. The "identity must equal owning user id"
/// checks in the handlers stay unchanged either way.
///
/// A header that is absent, not an integer, or not positive all collapse to
/// "no identity" and get a 401.
pub async fn identity_middleware(
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let claimed = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0);

    let Some(user_id) = claimed else {
        return Err(ApiError::Unauthorized(
            "X-User-Id header is required".to_string(),
        ));
    };

    req.extensions_mut().insert(CallerIdentity(user_id));
    Ok(next.run(req).await)
}
