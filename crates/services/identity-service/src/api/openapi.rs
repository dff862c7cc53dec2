//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::change_password_handler;
use domain::{OperationError, OperationErrorCode};

/// OpenAPI documentation for the identity service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Identity Service",
        version = "0.1.0",
        description = "Password change and administrative password reset"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        change_password_handler::change_password,
        change_password_handler::force_change_password,
    ),
    components(
        schemas(
            change_password_handler::ChangePasswordRequest,
            change_password_handler::ForceChangePasswordRequest,
            OperationError,
            OperationErrorCode,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Password", description = "Password change operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
