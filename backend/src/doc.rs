//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the callable endpoints, the dispatcher trigger
//! endpoints and the health probes, plus the bearer token security scheme
//! used by `processPlantData`. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, ReactionReport, StepOutcome, StepReport};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.description = Some("Identity token issued by the identity provider.".to_owned());
        components.add_security_scheme("BearerToken", SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "LeafLine backend API",
        description = "Callable handlers and document event reactors for the LeafLine plant-care app."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::greeting::say_hello,
        crate::inbound::http::plant_care::process_plant_data,
        crate::inbound::http::triggers::user_created,
        crate::inbound::http::triggers::plant_created,
        crate::inbound::http::triggers::message_updated,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, ReactionReport, StepReport, StepOutcome)),
    tags(
        (name = "callable", description = "Client-invoked request/response handlers"),
        (name = "triggers", description = "Document event reactors invoked by the dispatcher"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
