//! HTTP inbound adapter exposing the callable and trigger endpoints.

pub mod callable;
pub mod caller;
pub mod error;
pub mod greeting;
pub mod health;
pub mod plant_care;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod triggers;

pub use error::ApiResult;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::domain::Error;

/// Register every callable and trigger route plus the JSON error mapping.
///
/// Health probes are registered separately because they carry their own
/// state.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use leafline::inbound::http::configure_routes;
///
/// let _app = App::new().configure(configure_routes);
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(callable::json_config())
        .service(greeting::say_hello)
        .service(plant_care::process_plant_data)
        .service(triggers::user_created)
        .service(triggers::plant_created)
        .service(triggers::message_updated)
        .default_service(web::to(unknown_route));
}

/// Answer requests for unregistered paths with a `NOT_FOUND` envelope.
async fn unknown_route(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::not_found(format!("no callable or trigger at {}", req.path())))
}
