use crate::config::ProxyConfig;
use crate::logging::SharedLogger;
use crate::proxy;
use crate::translate::anthropic_types::{ErrorResponse, MessagesRequest};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/messages", post(handle_messages))
        .route("/v1/translate", post(handle_translate))
        .route("/v1/models", get(handle_models))
        .route("/health", get(handle_health))
        .route("/logs", get(handle_logs))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse an Anthropic request body, or produce the 400 response for it.
fn parse_request(state: &AppState, body: &Bytes) -> Result<MessagesRequest, Response> {
    serde_json::from_slice(body).map_err(|e| {
        state
            .logger
            .error("server", format!("Failed to parse request: {}", e));
        let err = ErrorResponse::invalid_request(format!("Invalid request body: {}", e));
        (StatusCode::BAD_REQUEST, Json(err)).into_response()
    })
}

fn error_response(state: &AppState, e: &crate::ProxyError) -> Response {
    if e.is_client_error() {
        state.logger.warn("server", format!("Rejected request: {}", e));
        let err = ErrorResponse::invalid_request(e.to_string());
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }
    state.logger.error("server", format!("Proxy error: {}", e));
    let err = ErrorResponse::api_error(format!("Proxy error: {}", e));
    (StatusCode::BAD_GATEWAY, Json(err)).into_response()
}

async fn handle_messages(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req = match parse_request(&state, &body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    state.logger.info(
        "server",
        format!(
            "Request: model={} messages={} tools={}",
            req.model,
            req.messages.len(),
            req.tools.as_ref().map_or(0, Vec::len)
        ),
    );

    if req.stream.unwrap_or(false) {
        let err = ErrorResponse::invalid_request(
            "Streaming is not supported by this proxy; send the request with stream=false",
        );
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    match proxy::proxy_generate(&req, &state.config, &state.client, &state.logger).await {
        Ok(proxy::ProxyResult::Success(resp)) => Json(resp).into_response(),
        Ok(proxy::ProxyResult::Error(err, status_code)) => {
            let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(err)).into_response()
        }
        Err(e) => error_response(&state, &e),
    }
}

/// Show what would be sent upstream without sending it.
async fn handle_translate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req = match parse_request(&state, &body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match proxy::translate_for_upstream(&req, &state.config, &state.logger) {
        Ok(translation) => Json(serde_json::json!({
            "request": translation.request,
            "dropped": translation.dropped,
        }))
        .into_response(),
        Err(e) => error_response(&state, &e),
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models: Vec<serde_json::Value> = state
        .config
        .model_mapper()
        .advertised()
        .into_iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "object": "model",
                "owned_by": "code-assist",
            })
        })
        .collect();

    Json(serde_json::json!({ "data": models, "object": "list" }))
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    #[serde(default = "default_logs_limit")]
    limit: usize,
}

fn default_logs_limit() -> usize {
    100
}

async fn handle_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "entries": state.logger.recent(query.limit) }))
}
