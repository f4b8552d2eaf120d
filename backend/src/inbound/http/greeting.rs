//! `sayHello` callable.
//!
//! ```text
//! POST /sayHello {"data":{"name":"Fern"}}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Greeting, GreetingRequest};
use crate::inbound::http::callable::{CallableRequest, CallableResponse};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Arguments of `sayHello`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SayHelloData {
    /// Name to greet; defaults to `User`.
    #[schema(example = "Fern")]
    pub name: Option<String>,
}

impl From<SayHelloData> for GreetingRequest {
    fn from(value: SayHelloData) -> Self {
        Self::new(value.name)
    }
}

/// Greet the caller by name. No authentication required.
#[utoipa::path(
    post,
    path = "/sayHello",
    request_body = CallableRequest<SayHelloData>,
    responses(
        (status = 200, description = "Greeting", body = CallableResponse<Greeting>),
        (status = 400, description = "Malformed request body", body = ErrorEnvelope)
    ),
    tags = ["callable"],
    operation_id = "sayHello",
    security([])
)]
#[post("/sayHello")]
pub async fn say_hello(
    state: web::Data<HttpState>,
    payload: web::Json<CallableRequest<SayHelloData>>,
) -> web::Json<CallableResponse<Greeting>> {
    let request = GreetingRequest::from(payload.into_inner().into_data());
    CallableResponse::json(state.greeting.greet(&request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::callable::json_config;
    use crate::inbound::http::test_utils::state_with_identity;
    use crate::domain::ports::FixtureIdentityProvider;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn call(body: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_identity(FixtureIdentityProvider)))
                .app_data(json_config())
                .service(say_hello),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/sayHello")
            .insert_header(("content-type", "application/json"))
            .set_payload(body.to_owned())
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[case(r#"{"data":{"name":"Fern"}}"#, "Hello, Fern! Welcome to LeafLine 🌿")]
    #[case(r#"{"data":{}}"#, "Hello, User! Welcome to LeafLine 🌿")]
    #[case(r#"{"data":null}"#, "Hello, User! Welcome to LeafLine 🌿")]
    #[case(r#"{}"#, "Hello, User! Welcome to LeafLine 🌿")]
    #[actix_web::test]
    async fn greets_by_name_or_default(#[case] body: &str, #[case] message: &str) {
        let (status, value) = call(body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({"result": {
                "message": message,
                "timestamp": "2024-05-01T09:30:00.000Z",
                "success": true
            }})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_bodies_are_invalid_arguments() {
        let (status, value) = call("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            value.pointer("/error/status").and_then(Value::as_str),
            Some("INVALID_ARGUMENT")
        );
    }
}
