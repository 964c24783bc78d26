//! Integration tests for building an application from configuration.

use heron::prelude::*;
use heron::testing::{RecordingResponse, TestRequest};
use http::StatusCode;
use serde_json::json;

const CONFIG: &str = r#"
[app]
environment = "development"

[routing]
default_controller = "Home"
trailing_slash_optional = true

[[routing.routes]]
pattern = "/"
call = "@default"

[[routing.routes]]
pattern = "/book/:id[\\d]"
call = "Book.show"

[[routing.routes]]
pattern = "/book"
call = { GET = "Book.list", POST = "Book.create" }
args = { format = "json" }

[[routing.routes]]
pattern = "/lang/:code{en|fr}"
call = "Book.lang"
"#;

struct Controllers {
    base: ControllerBase,
}

impl Controller for Controllers {
    fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
        Ok(Self { base: deps.base() })
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }
}

fn app() -> Application {
    let config = ConfigLoader::new()
        .with_string(CONFIG, "toml")
        .unwrap()
        .load()
        .unwrap();
    let mut app = Application::from_config(&config).unwrap();

    app.controller::<Controllers>("Home")
        .index([], |_, _| Ok(json!("home")));
    app.controller::<Controllers>("Book")
        .action("show", [ParamSpec::int("id")], |_, ctx| Ok(json!(ctx.get("id"))))
        .action("list", [], |book, _| Ok(json!(book.base().option("format"))))
        .action("create", [], |_, _| Ok(json!("created")))
        .action("lang", [ParamSpec::str("code")], |_, ctx| {
            Ok(json!(ctx.get_str("code")))
        });
    app
}

fn get(path: &str) -> RecordingResponse {
    let mut response = RecordingResponse::new();
    app().run(&TestRequest::get(path), &mut response).unwrap();
    response
}

#[test]
fn test_configured_routes_are_registered_in_order() {
    let routes = app().routes();
    let patterns: Vec<&str> = routes.iter().map(|r| r.pattern.as_str()).collect();
    assert_eq!(patterns, ["/", "/book/:id[\\d]", "/book", "/lang/:code{en|fr}"]);
    assert_eq!(routes[2].methods, ["GET", "POST"]);
}

#[test]
fn test_configured_default_controller() {
    get("/").assert_status(StatusCode::OK).assert_body_eq(&json!("home"));
}

#[test]
fn test_configured_route_dispatches() {
    get("/book/9").assert_body_eq(&json!(9));
}

#[test]
fn test_trailing_slash_option() {
    get("/book/9/").assert_body_eq(&json!(9));
}

#[test]
fn test_route_args_become_controller_options() {
    get("/book").assert_body_eq(&json!("json"));
}

#[test]
fn test_alternation_capture() {
    get("/lang/fr").assert_body_eq(&json!("fr"));
    get("/lang/de").assert_status(StatusCode::NOT_FOUND);
}

#[test]
fn test_development_environment_displays_errors() {
    // No `Home.error` action: the debug rendering becomes the body.
    let response = get("/nowhere");
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("Error: Not found: no route matches `/nowhere`")
        .assert_body_contains("has no error action");
}

#[test]
fn test_invalid_route_rejected_at_load() {
    let bad = r#"
[[routing.routes]]
pattern = "/book/:id["
call = "Book.show"
"#;
    let err = ConfigLoader::new()
        .with_string(bad, "toml")
        .unwrap()
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("routing.routes[0].pattern"));
}
