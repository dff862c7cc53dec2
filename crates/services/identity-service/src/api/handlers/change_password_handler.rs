//! Password change handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::require_operation;
use crate::api::AppState;
use common::AppResult;
use domain::{OperationError, OperationOutcome, PasswordOperation, Principal};

/// Change own password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Password currently set on the caller's account
    #[validate(
        required(message = "The currentPassword field is required."),
        length(min = 1, message = "The currentPassword field is required.")
    )]
    #[schema(example = "Old-Pass1")]
    pub current_password: Option<String>,
    /// Replacement password
    #[validate(
        required(message = "The newPassword field is required."),
        length(min = 1, message = "The newPassword field is required.")
    )]
    #[schema(example = "New-Pass2")]
    pub new_password: Option<String>,
}

/// Administrative password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForceChangePasswordRequest {
    /// Account whose password is replaced
    #[validate(
        required(message = "The userName field is required."),
        length(min = 1, message = "The userName field is required.")
    )]
    #[schema(example = "alice")]
    pub user_name: Option<String>,
    #[validate(
        required(message = "The newPassword field is required."),
        length(min = 1, message = "The newPassword field is required.")
    )]
    #[schema(example = "Reset-Pass3")]
    pub new_password: Option<String>,
}

/// Create password change routes (mounted behind the auth middleware)
pub fn change_password_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(change_password))
        .route("/force", post(force_change_password))
}

/// Change the caller's own password
#[utoipa::path(
    post,
    path = "/api/changepassword",
    tag = "Password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Password change failed", body = [OperationError])
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Response> {
    require_operation(&principal, PasswordOperation::ChangeOwn)?;

    let outcome = state
        .password_service
        .change_password(
            &principal,
            payload.current_password.as_deref().unwrap_or_default(),
            payload.new_password.as_deref().unwrap_or_default(),
        )
        .await;

    Ok(outcome_response(outcome))
}

/// Replace another account's password (Admin only)
#[utoipa::path(
    post,
    path = "/api/changepassword/force",
    tag = "Password",
    request_body = ForceChangePasswordRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 500, description = "Password change failed", body = [OperationError])
    ),
    security(("bearer_auth" = []))
)]
pub async fn force_change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<ForceChangePasswordRequest>,
) -> AppResult<Response> {
    require_operation(&principal, PasswordOperation::ForceChange)?;

    let outcome = state
        .password_service
        .force_change_password(
            payload.user_name.as_deref().unwrap_or_default(),
            payload.new_password.as_deref().unwrap_or_default(),
        )
        .await;

    Ok(outcome_response(outcome))
}

/// 204 on success, otherwise 500 with the error list as the body.
fn outcome_response(outcome: OperationOutcome) -> Response {
    match outcome {
        OperationOutcome::Succeeded => StatusCode::NO_CONTENT.into_response(),
        OperationOutcome::Failed(errors) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(errors)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_empty_fields_fail_validation() {
        let missing: ChangePasswordRequest =
            serde_json::from_value(json!({ "newPassword": "New-Pass2" })).unwrap();
        let empty: ChangePasswordRequest =
            serde_json::from_value(json!({ "currentPassword": "", "newPassword": "x" })).unwrap();

        for request in [missing, empty] {
            let errors = request.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("current_password"));
            assert_eq!(errors.field_errors().len(), 1);
        }
    }

    #[test]
    fn test_force_request_uses_wire_names() {
        let request: ForceChangePasswordRequest =
            serde_json::from_value(json!({ "userName": "bob", "newPassword": "Reset-Pass3" }))
                .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.user_name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_failed_outcome_is_500() {
        let response =
            outcome_response(OperationOutcome::failed(OperationError::password_mismatch()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            outcome_response(OperationOutcome::success()).status(),
            StatusCode::NO_CONTENT
        );
    }
}
