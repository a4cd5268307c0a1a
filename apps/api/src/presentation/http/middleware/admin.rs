use axum::{extract::State, middleware::Next, response::Response};

use crate::presentation::http::{
    errors::AppError, middleware::user::decode_required_user_claims, state::AppState,
};

/// Rejects requests whose bearer token is missing (401) or lacks the admin
/// role (403). Accepted claims are stored as a request extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = decode_required_user_claims(req.headers(), &state.config.jwt_secret)?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden(format!(
            "user {} is not an administrator",
            claims.sub
        )));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
