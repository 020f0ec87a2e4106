//! # Fake Analysis Service
//!
//! An in-process axum server that answers like the CodeMap API: it lists
//! `def` names from the submitted code and, when `function_name` is given,
//! returns a small flowchart for that function.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A request as the fake service received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedRequest {
    pub code: String,
    pub function_name: Option<String>,
}

#[derive(Clone, Default)]
pub struct ServiceLog {
    pub requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl ServiceLog {
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Function names declared with `def` in `code`, in source order.
pub fn def_names(code: &str) -> Vec<String> {
    code.lines()
        .filter_map(|line| line.trim_start().strip_prefix("def "))
        .filter_map(|rest| rest.split('(').next())
        .map(|name| name.trim().to_string())
        .collect()
}

async fn analyze(
    State(log): State<ServiceLog>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let code = body["code"].as_str().unwrap_or_default().to_string();
    let function_name = params.get("function_name").cloned();
    log.requests.lock().unwrap().push(ReceivedRequest {
        code: code.clone(),
        function_name: function_name.clone(),
    });

    let names = def_names(&code);
    let mut result = json!({
        "functions": {"count": names.len(), "names": names},
        "flowchart": null
    });

    if let Some(name) = function_name {
        if !names.contains(&name) {
            result["error"] = json!(format!("Function '{name}' not found"));
            return Json(result);
        }
        let flowchart = if name == "broken" {
            "flowchart TD\nN0[\"start\"] -->".to_string()
        } else {
            format!("flowchart TD\nN0((\"Function: {name}()\"))\nN1[\"return 1\"]\nN0 --> N1")
        };
        result["flowchart"] = json!(flowchart);
    }
    Json(result)
}

async fn banner() -> Json<Value> {
    Json(json!({"message": "CodeMap API running"}))
}

pub fn service_router(log: ServiceLog) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/analyze", post(analyze))
        .with_state(log)
}

/// A router whose analyze endpoint always fails with `status`.
pub fn failing_router(status: StatusCode) -> Router {
    Router::new().route(
        "/analyze",
        post(move || async move { (status, "analysis backend exploded") }),
    )
}

/// A router whose analyze endpoint answers with something that is not a report.
pub fn garbage_router(body: &'static str) -> Router {
    Router::new().route("/analyze", post(move || async move { body }))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
