//! API integration tests
//!
//! Exercises the HTTP endpoints with `tower::ServiceExt::oneshot` against a
//! router whose steps are small shell scripts.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tf_core::config::Config;
use tf_server::{build_router, AppContext};
use tower::ServiceExt;

/// Router over the builtin registry with each step replaced by a script.
fn create_test_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.executor.max_parallel = 3;

    let scripts = [
        ("data-cleaning", r#"tr 'A-Z' 'a-z' < "$1" > "$2""#),
        ("sentiment-analysis", r#"printf '{"score": 0.0}' > "$2""#),
        ("text-summarization", r#"echo 'summarizer exploded' >&2; exit 1"#),
    ];
    for (name, body) in scripts {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        config.steps.overrides.insert(name.to_string(), path);
    }

    let app = build_router(AppContext::new(config));
    (dir, app)
}

async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response.into_body()).await["status"], "ok");
}

#[tokio::test]
async fn steps_endpoint_lists_registry() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(Request::get("/steps").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["launcher"], "process");
    assert_eq!(json["selector"], "heuristic");
    assert_eq!(json["max_parallel"], 3);
    assert!(json["step_timeout_secs"].is_null());

    let steps = json["steps"].as_array().unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["data-cleaning", "sentiment-analysis", "text-summarization"]);
    assert!(steps.iter().all(|s| s["available"] == true));
}

#[tokio::test]
async fn process_runs_selected_steps() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json(
            "/process",
            json!({"request": "Clean this text", "text": "Hello WORLD"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["request"], "Clean this text");
    assert_eq!(json["execution_plan"], json!(["data-cleaning"]));
    assert_eq!(json["output"], "hello world");
    assert_eq!(json["parameters"], json!({}));
    assert_eq!(json["parallel"], false);
    assert_eq!(json["results"][0]["status"], "success");
    assert!(json["run_id"].is_string());
    assert!(json["execution_time"].is_number());
}

#[tokio::test]
async fn process_reports_step_failures_in_results() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json(
            "/process",
            json!({"request": "Clean and summarize this", "text": "Some TEXT"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["error"], "summarizer exploded");
    assert_eq!(json["output"], "some text");
}

#[tokio::test]
async fn explicit_plan_runs_in_parallel() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json(
            "/process",
            json!({
                "request": "clean in parallel",
                "text": "ABC",
                "plan": ["data-cleaning", "data-cleaning"],
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["parallel"], true);
    assert_eq!(json["parameters"], json!({"parallel": true}));
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_text_is_bad_request() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json("/process", json!({"request": "clean"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn empty_request_is_bad_request() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json("/process", json!({"request": "", "text": "abc"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_step_is_reported_in_band() {
    let (_dir, app) = create_test_app();
    let response = app
        .oneshot(post_json(
            "/process",
            json!({"request": "translate", "text": "abc", "plan": ["translate"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["request"], "translate");
    assert!(json["error"].as_str().unwrap().contains("translate"));
}
