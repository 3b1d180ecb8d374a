//! HTTP transport for the water-quality API
//!
//! Axum router over the query engine and the chatbot. Every route is a thin
//! adapter: extract parameters, call the core, serialize the result.

use crate::{
    chatbot::{Chatbot, ChatbotReply},
    config::Config,
    error::{Result, WaterError},
    query::{Lookup, QueryEngine},
    store::MeasurementRecord,
};
use axum::{
    Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub const NOT_FOUND_DETAIL: &str = "medición no encontrada";
pub const NO_DATA_DETAIL: &str = "No hay datos de mediciones de calidad de agua disponibles";

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub engine: QueryEngine,
    pub chatbot: Chatbot,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    #[serde(rename = "Departamento", default)]
    pub departamento: Option<String>,
    #[serde(rename = "Municipio", default)]
    pub municipio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    #[serde(default)]
    pub query: Option<String>,
}

// Only an absent parameter is rejected; blank values reach the core as-is
fn required(value: Option<String>, name: &str) -> Result<String> {
    value.ok_or_else(|| WaterError::Validation {
        message: format!("query parameter '{}' is required", name),
    })
}

/// Run CPU-bound core work on the blocking pool so the request timeout can
/// cut it off.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| WaterError::Internal {
            message: format!("query task failed: {}", e),
        })
}

/// Welcome page
pub async fn home_handler() -> Html<&'static str> {
    Html("<h1>Bienvenido al informe de mediciones de calidad del agua en Colombia 2017-2023</h1>")
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
pub async fn info_handler(State(state): State<HttpState>) -> Json<Value> {
    Json(json!({
        "records": state.engine.store().len(),
        "keywords": state.chatbot.keywords().len(),
        "triggers": state.chatbot.keywords().triggers().collect::<Vec<_>>(),
        "lexicon_lemmas": state.chatbot.lexicon().vocabulary_size(),
        "list_cap": state.config.query.list_cap,
        "match_synonyms": state.config.chatbot.match_synonyms,
        "server": {
            "bind": state.config.runtime.http_bind.to_string()
        }
    }))
}

/// `GET /water`: first records in file order, never more than the configured cap
pub async fn list_handler(
    State(state): State<HttpState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MeasurementRecord>>> {
    if state.engine.store().is_empty() {
        return Err(WaterError::NoData {
            message: NO_DATA_DETAIL.into(),
        });
    }
    let cap = state.config.query.list_cap;
    let limit = params.limit.map_or(cap, |l| l.min(cap));
    Ok(Json(state.engine.list_all(Some(limit)).to_vec()))
}

/// `GET /water/{id}`
pub async fn get_by_id_handler(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Response {
    match state.engine.get_by_id(&id) {
        Lookup::Found(record) => Json(record.clone()).into_response(),
        Lookup::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detalle": NOT_FOUND_DETAIL })),
        )
            .into_response(),
    }
}

/// `GET /water/departamento?Departamento=&Municipio=`
pub async fn location_handler(
    State(state): State<HttpState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<Vec<MeasurementRecord>>> {
    let departamento = required(params.departamento, "Departamento")?;
    let municipio = params.municipio;
    let records = run_blocking(move || {
        let records: Vec<MeasurementRecord> = state
            .engine
            .filter_by_location(&departamento, municipio.as_deref())
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(
            "location filter '{}' / {:?}: {} records",
            departamento,
            municipio,
            records.len()
        );
        records
    })
    .await?;
    Ok(Json(records))
}

/// `GET /water/periodo?query=`: tokens are synonym-expanded before filtering
pub async fn period_handler(
    State(state): State<HttpState>,
    Query(params): Query<TextQuery>,
) -> Result<Json<Vec<MeasurementRecord>>> {
    let query = required(params.query, "query")?;
    let records = run_blocking(move || {
        let tokens = state.chatbot.expanded_query(&query);
        state
            .engine
            .filter_by_period(&tokens)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    })
    .await?;
    Ok(Json(records))
}

/// `GET /chatbot?query=`
pub async fn chatbot_handler(
    State(state): State<HttpState>,
    Query(params): Query<TextQuery>,
) -> Result<Json<ChatbotReply>> {
    let query = required(params.query, "query")?;
    let reply = run_blocking(move || state.chatbot.respond(&query)).await?;
    Ok(Json(reply))
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "detail": "request timed out" })),
        )
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": err.to_string() })),
        )
    }
}

/// Build the router with CORS, tracing and the per-request timeout
pub fn router(state: HttpState) -> Router {
    let timeout = Duration::from_millis(state.config.runtime.http_request_timeout_ms);

    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/water", get(list_handler))
        .route("/water/departamento", get(location_handler))
        .route("/water/departamento/", get(location_handler))
        .route("/water/periodo", get(period_handler))
        .route("/water/:id", get(get_by_id_handler))
        .route("/chatbot", get(chatbot_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: HttpState) -> anyhow::Result<()> {
    let bind = state.config.runtime.http_bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
