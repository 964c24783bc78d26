//! End-to-end dispatch tests.
//!
//! These tests drive a full [`Application`] through [`TestRequest`] and
//! [`RecordingResponse`], covering successful dispatch, the error cascade
//! and configuration errors.

use std::sync::{Arc, Mutex};

use heron::prelude::*;
use heron::telemetry::CascadeLevel;
use heron::testing::{RecordingResponse, TestRequest};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

/// A controller with a shelf service injected.
struct BookController {
    base: ControllerBase,
    shelf: Arc<Shelf>,
}

/// A test service for DI.
#[derive(Debug, Default)]
struct Shelf {
    titles: Vec<&'static str>,
}

impl Controller for BookController {
    fn construct(deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
        Ok(Self {
            base: deps.base(),
            shelf: deps.inject::<Shelf>()?,
        })
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }
}

/// The default controller; builds its base lazily.
struct IndexController {
    base: ControllerBase,
}

impl Controller for IndexController {
    fn construct(_deps: &mut Dependencies<'_>) -> Result<Self, InjectionError> {
        Ok(Self {
            base: ControllerBase::uninit(),
        })
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }
}

/// A structured extra argument.
#[derive(Debug, Deserialize)]
struct Filter {
    genre: String,
}

fn settings(display_errors: bool) -> AppSettings {
    AppSettings {
        display_errors,
        ..AppSettings::default()
    }
}

fn library(display_errors: bool) -> Application {
    let shelf = Shelf {
        titles: vec!["Dune", "Emma", "Ulysses"],
    };
    let mut app = Application::builder()
        .settings(settings(display_errors))
        .service(Arc::new(shelf))
        .build();

    app.controller::<BookController>("Book")
        .action("show", [ParamSpec::int("id")], |book, ctx| {
            let id = ctx.get("id").cloned().unwrap_or(Value::Null);
            let title = id
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| book.shelf.titles.get(i))
                .copied();
            Ok(json!({ "id": id, "title": title }))
        })
        .action("raw", [ParamSpec::new("id")], |_, ctx| {
            Ok(ctx.get("id").cloned().unwrap_or(Value::Null))
        })
        .action("list", [ParamSpec::new("filter")], |book, ctx| {
            let filter: Option<Filter> = ctx.parse("filter")?;
            Ok(json!({
                "genre": filter.map(|f| f.genre),
                "count": book.shelf.titles.len(),
            }))
        })
        .action("create", [], |_, _| {
            Err(HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, "title is required").into())
        })
        .action("teapot", [], |_, _| Err(CodedError::new(418, "short and stout").into()))
        .action("crash", [], |_, ctx| {
            ctx.echo("partial output");
            Err(CodedError::new(42, "meaning of life").into())
        })
        .action("layout", [], |book, _| {
            Ok(json!(book.base().option("layout")))
        });

    app.controller::<IndexController>("Index")
        .index([], |controller, _| {
            Ok(json!({ "initialized": controller.base().is_initialized() }))
        })
        .error_action(|_, ctx| {
            let envelope = ctx.error_envelope().expect("error action sees the error");
            Ok(json!({ "error": envelope.error.code }))
        });

    app.get("/", "@default").unwrap();
    app.get("/book/:id[\\d]", "Book.show").unwrap();
    app.get("/raw/:id", "Book.raw").unwrap();
    let mut list_args = ExtraArgs::new();
    list_args.insert("filter".to_string(), json!({ "genre": "novel" }));
    app.add_route("/book", "GET", "Book.list", list_args).unwrap();
    app.post("/book", "Book.create").unwrap();
    app.get("/teapot", "Book.teapot").unwrap();
    app.get("/crash", "Book.crash").unwrap();
    app.get("/missing-action", "Book.nowhere").unwrap();
    app.get("/ghost", "Ghost.show").unwrap();
    app
}

fn run(app: &mut Application, request: TestRequest) -> (DispatchOutcome, RecordingResponse) {
    let mut response = RecordingResponse::new();
    let outcome = app.run(&request, &mut response).expect("dispatch succeeds");
    (outcome, response)
}

#[test]
fn test_end_to_end_typed_parameter_is_coerced() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/book/1"));

    response
        .assert_status(StatusCode::OK)
        .assert_body_eq(&json!({ "id": 1, "title": "Emma" }));
    assert_eq!(outcome.controller.as_deref(), Some("Book"));
    assert_eq!(outcome.action.as_deref(), Some("show"));
    assert_eq!(outcome.cascade, None);
    assert_eq!(response.body_writes(), 1);
}

#[test]
fn test_end_to_end_untyped_parameter_stays_string() {
    let (_, response) = run(&mut library(false), TestRequest::get("/raw/7"));
    response.assert_body_eq(&json!("7"));
}

#[test]
fn test_class_constraint_rejects_non_digits() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/book/abc"));

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(outcome.cascade, Some(CascadeLevel::Handler));
    response.assert_body_eq(&json!({ "error": "NOT_FOUND" }));
}

#[test]
fn test_default_directive_reaches_default_controller() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/"));

    response.assert_body_eq(&json!({ "initialized": true }));
    assert_eq!(outcome.controller.as_deref(), Some("Index"));
    assert_eq!(outcome.action.as_deref(), Some("index"));
}

#[test]
fn test_method_table_selects_call() {
    let (_, response) = run(&mut library(false), TestRequest::get("/book"));
    response.assert_body_eq(&json!({ "genre": "novel", "count": 3 }));

    let (outcome, response) = run(&mut library(false), TestRequest::post("/book"));
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome.action.as_deref(), Some("create"));
}

#[test]
fn test_method_not_allowed() {
    let (outcome, response) = run(&mut library(false), TestRequest::delete("/book"));

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    response.assert_body_eq(&json!({ "error": "METHOD_NOT_ALLOWED" }));
    assert!(outcome.is_error());
}

#[test]
fn test_declared_http_status_is_used() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/teapot"));
    assert_eq!(outcome.status.as_u16(), 418);
    response.assert_status(StatusCode::IM_A_TEAPOT);
}

#[test]
fn test_code_outside_error_range_becomes_500() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/crash"));

    // `Book` has no error action; what the action echoed becomes the body.
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_body_eq(&json!("partial output"));
    assert_eq!(outcome.cascade, Some(CascadeLevel::Fallback));
}

#[test]
fn test_unknown_action_falls_back_to_resolved_controller() {
    // `Book` has no error action, so the cascade ends at level 2.
    let (outcome, response) = run(&mut library(false), TestRequest::get("/missing-action"));

    response.assert_status(StatusCode::NOT_FOUND).assert_no_body();
    assert_eq!(outcome.cascade, Some(CascadeLevel::Fallback));
    assert_eq!(outcome.controller.as_deref(), Some("Book"));
    assert_eq!(outcome.action, None);
}

#[test]
fn test_unknown_controller_falls_back_to_default_controller() {
    let (outcome, response) = run(&mut library(false), TestRequest::get("/ghost"));

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_body_eq(&json!({ "error": "CONTROLLER_NOT_FOUND" }));
    assert_eq!(outcome.controller, None);
    assert_eq!(outcome.cascade, Some(CascadeLevel::Handler));
}

#[test]
fn test_display_errors_renders_debug_text() {
    let mut app = Application::builder()
        .settings(settings(true))
        .service(Arc::new(Shelf::default()))
        .build();
    app.controller::<BookController>("Book").action("crash", [], |_, ctx| {
        ctx.echo("partial output");
        Err(anyhow::anyhow!("disk on fire").context("loading book"))
    });
    app.get("/crash", "Book.crash").unwrap();

    let (outcome, response) = run(&mut app, TestRequest::get("/crash"));

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_body_contains("Error: loading book\nCaused by: disk on fire")
        .assert_body_contains("fallback controller `Book` has no error action")
        .assert_body_contains("partial output");
    assert_eq!(outcome.cascade, Some(CascadeLevel::Fallback));
}

#[test]
fn test_hidden_errors_keep_body_minimal() {
    let mut app = Application::new(settings(false));
    app.controller::<IndexController>("Index")
        .action("crash", [], |_, _| Err(anyhow::anyhow!("secret detail")));
    app.get("/crash", "Index.crash").unwrap();

    let (_, response) = run(&mut app, TestRequest::get("/crash"));
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_no_body();
}

#[test]
fn test_error_action_string_gets_output_appended() {
    let mut app = Application::new(settings(false));
    app.controller::<IndexController>("Index")
        .action("crash", [], |_, ctx| {
            ctx.echo("<p>half a page</p>");
            Err(HttpError::forbidden("no entry").into())
        })
        .error_action(|_, _| Ok(json!("<h1>Oops</h1>")));
    app.get("/crash", "Index.crash").unwrap();

    let (_, response) = run(&mut app, TestRequest::get("/crash"));
    response
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_eq(&json!("<h1>Oops</h1><p>half a page</p>"));
}

#[test]
fn test_options_reach_controller_from_extra_args() {
    let mut app = library(false);
    let mut extra = ExtraArgs::new();
    extra.insert("layout".to_string(), json!("wide"));
    app.add_route("/layout", "GET", "Book.layout", extra).unwrap();

    let (_, response) = run(&mut app, TestRequest::get("/layout"));
    response.assert_body_eq(&json!("wide"));
}

#[test]
fn test_callable_route() {
    let mut app = library(false);
    app.callable("/hello/:name", "GET", [ParamSpec::str("name")], |ctx| {
        Ok(json!(format!("hello {}", ctx.get_str("name").unwrap_or("stranger"))))
    })
    .unwrap();

    let (outcome, response) = run(&mut app, TestRequest::get("/hello/ada"));
    response.assert_body_eq(&json!("hello ada"));
    assert_eq!(outcome.controller.as_deref(), Some("Index"));
    assert_eq!(outcome.action, None);
}

#[test]
fn test_observers_run_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (before, error, after) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
    let events = DispatchEvents::new()
        .on_before_dispatch("before", move |state| {
            before.lock().unwrap().push(format!("before {}", state.path));
        })
        .on_error("error", move |_, err| {
            error.lock().unwrap().push(format!("error {err}"));
        })
        .on_after_dispatch("after", move |_, status| {
            after.lock().unwrap().push(format!("after {}", status.as_u16()));
        });

    let mut app = Application::builder().events(events).build();
    app.controller::<IndexController>("Index");
    app.get("/", "@default").unwrap();

    run(&mut app, TestRequest::get("/"));

    let log = log.lock().unwrap();
    assert_eq!(log[0], "before /");
    assert!(log[1].starts_with("error Not found: action `index`"));
    assert_eq!(log[2], "after 404");
}

#[test]
fn test_directive_without_controller_rejected_at_registration() {
    let mut app = library(false);
    let err = app.get("/orphan", ".show").unwrap_err();
    assert!(matches!(
        err,
        HeronError::Route(heron::router::RouteError::InvalidCallDirective(_))
    ));

    // Nothing was registered, so the request goes through the cascade.
    let (outcome, response) = run(&mut app, TestRequest::get("/orphan"));
    assert!(outcome.is_error());
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.body().is_some());
}

#[test]
fn test_empty_table_is_fatal() {
    let mut app = Application::new(AppSettings::default());
    let mut response = RecordingResponse::new();

    let err = app.run(&TestRequest::get("/"), &mut response).unwrap_err();
    assert!(matches!(err, HeronError::Route(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_missing_dependency_is_fatal() {
    let mut app = Application::new(AppSettings::default());
    app.controller::<BookController>("Book")
        .action("raw", [], |_, _| Ok(Value::Null));
    app.get("/raw", "Book.raw").unwrap();

    let mut response = RecordingResponse::new();
    let err = app.run(&TestRequest::get("/raw"), &mut response).unwrap_err();
    assert!(matches!(err, HeronError::Injection(_)));
}

#[test]
fn test_second_run_is_rejected() {
    let mut app = library(false);
    let mut response = RecordingResponse::new();
    app.run(&TestRequest::get("/"), &mut response).unwrap();

    let err = app.run(&TestRequest::get("/"), &mut response).unwrap_err();
    assert!(matches!(err, HeronError::AlreadyDispatched));
}
