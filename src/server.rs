//! Correction proxy
//!
//! Relays `{inputText}` to the chat-completion provider and answers with
//! `{correctedText}`. Every response carries permissive CORS headers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{Config, ServerConfig};
use crate::provider::{Corrector, ProviderClient};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "OPTIONS, POST";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRequest {
    pub input_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResponse {
    pub corrected_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
struct Health {
    ok: bool,
    service: &'static str,
}

/// Shared state of the proxy
#[derive(Clone)]
pub struct ProxyState {
    corrector: Arc<dyn Corrector>,
}

impl ProxyState {
    pub fn new(corrector: Arc<dyn Corrector>) -> Self {
        Self { corrector }
    }
}

fn error_response(status: StatusCode) -> Response {
    let message = status.canonical_reason().unwrap_or("Error").to_string();
    (status, Json(ErrorBody { error: message })).into_response()
}

/// POST handler: relay the input text to the provider
async fn correct(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request: CorrectionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejecting unparsable correction request: {}", e);
            return error_response(StatusCode::BAD_REQUEST);
        }
    };

    // Empty input never reaches the provider; clients validate before sending.
    if request.input_text.is_empty() {
        tracing::debug!("Rejecting empty correction request");
        return error_response(StatusCode::BAD_REQUEST);
    }

    tracing::debug!(
        "Correction requested for {} characters",
        request.input_text.chars().count()
    );

    match state.corrector.correct(&request.input_text).await {
        Ok(corrected_text) => Json(CorrectionResponse { corrected_text }).into_response(),
        Err(e) => {
            tracing::error!("Correction failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// CORS preflight: always 200 with an empty body
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health() -> Json<Health> {
    Json(Health {
        ok: true,
        service: "grammar-checker",
    })
}

/// Build the router (exposed for testing).
pub fn build_router(state: ProxyState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route(
            &config.endpoint_path,
            post(correct).options(preflight),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

/// Run the proxy until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let provider = ProviderClient::new(config.clone());
    if !provider.is_available() {
        tracing::warn!(
            "No provider API key configured; every correction will fail until {} is set",
            crate::config::API_KEY_ENV
        );
    }

    let state = ProxyState::new(Arc::new(provider));
    let app = build_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(
        "Correction proxy listening on http://{}{}",
        addr,
        config.server.endpoint_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Correction proxy shut down");
    Ok(())
}
