use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use kanban_back::store::TaskStore;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let store = TaskStore::in_memory().await.expect("in-memory store");
    kanban_back::app(store)
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` for an empty body).
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, task) = send(app, Method::POST, "/tasks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    task
}

#[tokio::test]
async fn post_with_description_only_applies_defaults() {
    let app = test_app().await;

    let task = create(&app, json!({ "description": "Buy milk" })).await;

    assert!(task["id"].is_i64());
    assert_eq!(task["description"], "Buy milk");
    assert_eq!(task["status"], "Some day");
    assert_eq!(task["priority"], "medium");
    assert!(task["created_at"].is_string());
}

#[tokio::test]
async fn post_with_empty_description_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({ "description": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Description is required and must be valid text"
    );
}

#[tokio::test]
async fn post_reports_every_invalid_field_at_once() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({ "description": "x", "status": "Blocked", "priority": "urgent" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid status. Allowed values: Some day, To do, In progress, Done. \
         Invalid priority. Allowed values: low, medium, high"
    );
}

#[tokio::test]
async fn post_without_json_object_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/tasks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON data");

    let (status, _) = send(&app, Method::POST, "/tasks", Some(json!("Buy milk"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_lists_newest_first() {
    let app = test_app().await;

    let first = create(&app, json!({ "description": "first" })).await;
    let second = create(&app, json!({ "description": "second" })).await;

    let (status, tasks) = send(&app, Method::GET, "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<_> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].clone())
        .collect();
    assert_eq!(ids, vec![second["id"].clone(), first["id"].clone()]);
}

#[tokio::test]
async fn patch_status_keeps_description() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "Buy milk" })).await;

    let uri = format!("/tasks?id={}", task["id"]);
    let (status, patched) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "status": "Done" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "Done");
    assert_eq!(patched["description"], "Buy milk");
    assert_eq!(patched["priority"], "medium");
    assert_eq!(patched["created_at"], task["created_at"]);
}

#[tokio::test]
async fn patch_with_only_unknown_fields_has_nothing_to_update() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "Buy milk" })).await;

    let uri = format!("/tasks?id={}", task["id"]);
    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "color": "red" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update");

    let (_, tasks) = send(&app, Method::GET, "/tasks", None).await;
    assert_eq!(tasks[0], task);
}

#[tokio::test]
async fn patch_validates_only_supplied_fields() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "Buy milk" })).await;

    let uri = format!("/tasks?id={}", task["id"]);
    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "priority": "urgent" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid priority. Allowed values: low, medium, high"
    );
}

#[tokio::test]
async fn patch_of_missing_task_is_not_found_before_validation() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/tasks?id=424242",
        Some(json!({ "status": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[tokio::test]
async fn put_replaces_every_field() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "draft" })).await;

    let uri = format!("/tasks?id={}", task["id"]);
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "description": "final", "status": "In progress", "priority": "high" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], task["id"]);
    assert_eq!(updated["description"], "final");
    assert_eq!(updated["status"], "In progress");
    assert_eq!(updated["priority"], "high");
}

#[tokio::test]
async fn put_requires_every_field() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "draft" })).await;

    let uri = format!("/tasks?id={}", task["id"]);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "description": "final" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid status."));
}

#[tokio::test]
async fn put_of_unknown_task_is_not_found() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/tasks?id=99999",
        Some(json!({ "description": "x", "status": "Done", "priority": "low" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));
}

#[tokio::test]
async fn writes_need_a_numeric_id() {
    let app = test_app().await;

    for uri in ["/tasks", "/tasks?id=abc", "/tasks?id=0"] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Invalid task id");
    }
}

#[tokio::test]
async fn delete_twice_is_not_found_the_second_time() {
    let app = test_app().await;
    let task = create(&app, json!({ "description": "temporary" })).await;

    let uri = format!("/tasks?id={}", task["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], task["id"]);
    assert_eq!(body["message"], "Task deleted");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[tokio::test]
async fn unsupported_method_is_405_with_json_error() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::TRACE, "/tasks", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/tasks")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("PATCH"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn description_with_nul_characters_is_stored() {
    let app = test_app().await;

    let task = create(&app, json!({ "description": "\u{0}Buy milk" })).await;
    assert_eq!(task["description"], "\u{0}Buy milk");

    let (status, tasks) = send(&app, Method::GET, "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["description"], "\u{0}Buy milk");
}

#[tokio::test]
async fn description_of_500_wide_characters_is_accepted() {
    let app = test_app().await;

    let description = "🥛".repeat(500);
    let task = create(&app, json!({ "description": description })).await;
    assert_eq!(task["description"], description.as_str());
}

#[tokio::test]
async fn options_is_answered_on_any_path() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::OPTIONS, "/anything/else", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn unknown_path_is_404_with_json_error() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/todos", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn panicking_handler_still_sends_cors_headers() {
    async fn explode() -> StatusCode {
        panic!("boom")
    }

    let app = kanban_back::with_layers(Router::new().route("/explode", axum::routing::get(explode)));

    let request = Request::builder()
        .uri("/explode")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({ "error": "Internal server error", "message": "boom" })
    );
}
