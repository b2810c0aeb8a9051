//! Route handlers for the tool tester UI and API.

use super::error::ApiError;
use super::{AppState, SESSION_COOKIE};
use crate::catalog::ToolCatalog;
use crate::types::{Mode, ProposedCall};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Serialize)]
struct TestResponse {
    model_message: Option<String>,
    function_calls: Vec<ProposedCall>,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (_, new_session) = catalog_for(&state, &headers).await;
    with_session_cookie(Html(INDEX_HTML).into_response(), new_session)
}

pub async fn list_tools(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (catalog, new_session) = catalog_for(&state, &headers).await;
    let tools = catalog.get();
    with_session_cookie(Json(tools.as_slice()).into_response(), new_session)
}

pub async fn test_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let data = json_body(&headers, &body)?;
    let query = match data.get("query") {
        None | Some(Value::Null) => {
            return Err(ApiError::bad_request("No query provided in request body"))
        }
        Some(Value::String(q)) => q.clone(),
        Some(_) => return Err(ApiError::bad_request("Query must be a string")),
    };

    let (catalog, new_session) = catalog_for(&state, &headers).await;
    let tools = catalog.get();
    debug!("Testing query against {} tools", tools.len());

    let result = state
        .orchestrator
        .round_trip(&query, &tools, Mode::Test)
        .await?;

    let body = TestResponse {
        model_message: result.model_message,
        function_calls: result.proposed_calls,
    };
    Ok(with_session_cookie(Json(body).into_response(), new_session))
}

pub async fn update_tools(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let data = json_body(&headers, &body)?;
    let elements = match data.get("tools") {
        None | Some(Value::Null) => return Err(ApiError::bad_request("No tools definition provided")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::bad_request("Tools definition must be an array")),
    };

    let (catalog, new_session) = catalog_for(&state, &headers).await;
    let tools = catalog.replace(elements)?;
    info!("Tools updated via API ({} tools)", tools.len());

    Ok(with_session_cookie(
        Json(json!({ "message": "ok" })).into_response(),
        new_session,
    ))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check the content type and decode the body as JSON.
fn json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, ApiError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::unsupported_media_type());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::bad_request("Request body is not valid JSON"))?;
    if !value.is_object() {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    }
    Ok(value)
}

/// Resolve the catalog serving this request. In session scope, a request
/// without a cookie for a live, server-issued session starts a new one, whose
/// id is returned for `Set-Cookie`.
async fn catalog_for(state: &AppState, headers: &HeaderMap) -> (Arc<ToolCatalog>, Option<String>) {
    match &state.catalogs {
        super::CatalogSource::Global(catalog) => (catalog.clone(), None),
        super::CatalogSource::Session(store) => {
            if let Some(id) = session_id(headers) {
                if let Some(catalog) = store.get(&id).await {
                    return (catalog, None);
                }
                debug!("Ignoring unknown session id from client");
            }
            let (id, catalog) = store.create().await;
            (catalog, Some(id))
        }
    }
}

/// Extract the session id from the `Cookie` header(s).
pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn with_session_cookie(mut resp: Response, session: Option<String>) -> Response {
    if let Some(id) = session {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            resp.headers_mut().append(SET_COOKIE, value);
        }
    }
    resp
}
