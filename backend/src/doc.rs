//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the merge REST surface. Swagger UI serves it in debug builds only.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the application's login flow.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Wayfarer merge API",
        description = "Account-merging workflow: invitations, merge/unmerge, \
                       public identity resolution, and history."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::merge::merge_status,
        crate::inbound::http::merge::send_invitation,
        crate::inbound::http::merge::accept_invitation,
        crate::inbound::http::merge::decline_invitation,
        crate::inbound::http::merge::cancel_invitation,
        crate::inbound::http::merge::unmerge,
        crate::inbound::http::merge::merge_history,
        crate::inbound::http::merge::public_profile,
        crate::inbound::http::merge::get_display_settings,
        crate::inbound::http::merge::update_display_settings,
        crate::inbound::http::public_html::public_identity_page,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "merge", description = "Account merge lifecycle"),
        (name = "public", description = "Public identity pages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
