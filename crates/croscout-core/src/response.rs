//! JSON envelope shared by every endpoint: `{success, message|error, ...payload}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};

/// Success body with a message and no payload.
pub fn message(msg: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": msg }))
}

/// Success body carrying `payload` under `key`, plus an optional message.
pub fn with_payload(key: &str, payload: Value, msg: Option<&str>) -> Json<Value> {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    if let Some(msg) = msg {
        body.insert("message".into(), Value::String(msg.to_owned()));
    }
    body.insert(key.to_owned(), payload);
    Json(Value::Object(body))
}

/// Failure body. Services wrap this from their error `IntoResponse` impls.
pub fn failure(status: StatusCode, kind: &str, error: &str) -> Response {
    let body = json!({ "success": false, "kind": kind, "error": error });
    (status, Json(body)).into_response()
}

/// Router fallback for unmatched paths.
pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "route not found" })),
    )
        .into_response()
}
