//! Behaviour tests for the generated OpenAPI document.
use std::sync::Mutex;

use leafline::ApiDoc;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use utoipa::OpenApi;

#[derive(Debug, Default)]
struct OpenApiWorld {
    json: Option<Value>,
}

#[fixture]
fn world() -> Mutex<OpenApiWorld> {
    Mutex::new(OpenApiWorld::default())
}

#[given("the OpenAPI document is generated")]
fn generate_openapi_document(world: &Mutex<OpenApiWorld>) {
    let doc = ApiDoc::openapi();
    let json = serde_json::to_value(&doc).expect("document serialises");
    world.lock().expect("world lock").json = Some(json);
}

#[when("the document is inspected")]
fn inspect_document(world: &Mutex<OpenApiWorld>) {
    let world = world.lock().expect("world lock");
    assert!(world.json.is_some(), "document should be generated");
}

fn with_json<R>(world: &Mutex<OpenApiWorld>, f: impl FnOnce(&Value) -> R) -> R {
    let world = world.lock().expect("world lock");
    f(world.json.as_ref().expect("document generated"))
}

#[then("processPlantData requires the bearer token")]
fn process_plant_data_requires_bearer(world: &Mutex<OpenApiWorld>) {
    with_json(world, |json| {
        let security = json
            .pointer("/paths/~1processPlantData/post/security")
            .expect("security requirement");
        assert_eq!(security, &serde_json::json!([{"BearerToken": []}]));
    });
}

#[then("sayHello is open to anonymous callers")]
fn say_hello_is_open(world: &Mutex<OpenApiWorld>) {
    with_json(world, |json| {
        let requires_bearer = json
            .pointer("/paths/~1sayHello/post/security")
            .and_then(Value::as_array)
            .is_some_and(|reqs| reqs.iter().any(|req| req.get("BearerToken").is_some()));
        assert!(!requires_bearer, "sayHello must not require a token");
    });
}

#[then("trigger responses reference the reaction report")]
fn triggers_reference_report(world: &Mutex<OpenApiWorld>) {
    with_json(world, |json| {
        for path in [
            "~1triggers~1users~1created",
            "~1triggers~1plants~1created",
            "~1triggers~1messages~1updated",
        ] {
            let pointer = format!("/paths/{path}/post/responses/200/content/application~1json/schema/$ref");
            let reference = json
                .pointer(&pointer)
                .and_then(Value::as_str)
                .unwrap_or_else(|| panic!("missing {pointer}"));
            assert!(reference.ends_with("ReactionReport"), "{reference}");
        }
    });
}

#[scenario(
    path = "tests/features/openapi_document.feature",
    name = "Callable security is documented"
)]
fn callable_security_is_documented(world: Mutex<OpenApiWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/openapi_document.feature",
    name = "Trigger reports are documented"
)]
fn trigger_reports_are_documented(world: Mutex<OpenApiWorld>) {
    drop(world);
}
