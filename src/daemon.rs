use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{AgentError, Result};
use crate::providers::anthropic::{AnthropicForwarder, ForwardOutcome};

#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<AnthropicForwarder>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            forwarder: Arc::new(AnthropicForwarder::new(config.anthropic.clone())),
        }
    }
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    messages: Value,
    #[serde(default)]
    system: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_response(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details,
        }),
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/claude", post(chat))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("SOL_AGENT_BUILD_VERSION").to_string(),
    })
}

async fn chat(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> Response {
    tracing::info!(
        model = state.forwarder.model(),
        "Making Claude API request"
    );

    match state
        .forwarder
        .forward(&payload.messages, payload.system.as_deref())
        .await
    {
        Ok(ForwardOutcome::Success(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(ForwardOutcome::Upstream { status, text }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, text, None)
        }
        Err(AgentError::Config(reason)) => {
            tracing::error!("Claude proxy misconfigured: {reason}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, reason, None)
        }
        Err(err) => {
            tracing::error!("Server error: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(err.to_string()),
            )
        }
    }
}

pub async fn run(config: &Config) -> Result<()> {
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

pub async fn run_with_shutdown<F>(config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if config.anthropic.api_key.is_none() {
        tracing::warn!("CLAUDE_API_KEY is not set; chat requests will fail until it is");
    }
    tracing::info!(
        model = %config.anthropic.model,
        api_url = %config.anthropic.api_url,
        api_version = %config.anthropic.api_version,
        "Claude API configuration"
    );

    let app = build_router(AppState::from_config(config));
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| AgentError::Runtime(e.to_string()))?;
    tracing::info!(bind = %config.server.bind, "proxy daemon listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AgentError::Runtime(e.to_string()))?;

    Ok(())
}
