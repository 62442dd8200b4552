use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::token::TokenError;

/// Identity proven by the bearer token, available to handlers as an `Extension`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

// ============================================================================
// Token Authentication Middleware
// ============================================================================

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from Authorization header; the raw token is expected,
    //    a "Bearer " prefix is tolerated
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::Invalid)?
        .trim();

    if header.is_empty() {
        return Err(TokenError::Missing.into());
    }
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    // 2. Verify signature and expiry
    let claims = state.tokens.verify(token)?;

    // 3. Inject identity into request extensions
    req.extensions_mut().insert(AuthenticatedUser { username: claims.sub });

    Ok(next.run(req).await)
}
