//! Bearer authentication middleware and the per-operation access check.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::api::AppState;
use common::AppError;
use domain::{is_permitted, PasswordOperation, Principal};

/// JWT authentication middleware.
///
/// Verifies the bearer token and injects the resulting [`Principal`] into the
/// request extensions. A missing or invalid token is rejected with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;

    let principal = state.token_verifier.verify(bearer.token()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Deny the request with 403 unless the principal may perform `operation`.
pub fn require_operation(
    principal: &Principal,
    operation: PasswordOperation,
) -> Result<(), AppError> {
    if is_permitted(principal, operation) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %principal.id(),
            operation = operation.as_str(),
            "Access denied"
        );
        Err(AppError::Forbidden)
    }
}
