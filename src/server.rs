//! HTTP layer: router, handlers, background sweep, server startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::session::{Session, SessionError, SessionStatus, SessionStore};
use crate::webhook::{SubmissionPayload, WebhookNotifier};

/// Start the Axum server with the provided configuration.
///
/// Binds the listener, spawns the session sweeper, and serves until ctrl-c.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let store = SessionStore::new();
    let notifier = WebhookNotifier::new(config.webhook.url.clone());

    if notifier.is_configured() {
        info!(
            name: "webhook.configured",
            url = %config.webhook.url.as_deref().unwrap_or_default(),
            "Agent webhook configured"
        );
    } else {
        info!(name: "webhook.unconfigured", "Agent webhook not configured, delivery disabled");
    }

    let sweeper = spawn_sweeper(
        store.clone(),
        Duration::from_secs(config.sessions.ttl_secs),
        Duration::from_secs(config.sessions.sweep_interval_secs),
    );

    let state = AppState {
        store,
        notifier,
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The sweeper loops forever; cut it loose once the server drains.
    sweeper.abort();
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let public_dir = state.config.server.public_dir.clone();
    Router::new()
        .route("/api/sessions", post(api_create_session))
        .route("/api/sessions", get(api_list_sessions))
        .route("/api/sessions/{id}", get(api_get_session))
        .route("/api/submit", post(api_submit))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Spawn the periodic sweep that purges expired sessions.
pub fn spawn_sweeper(
    store: SessionStore,
    ttl: Duration,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = store.sweep(ttl);
            if removed > 0 {
                info!(
                    name: "sweep.purged",
                    removed = removed,
                    remaining = store.len(),
                    "Expired sessions purged"
                );
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// JSON error body returned for 404/409 responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn store_error(e: &SessionError) -> ApiError {
    let status = match e {
        SessionError::NotFound => StatusCode::NOT_FOUND,
        SessionError::AlreadyFilled => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
        }),
    )
}

/// Response for session creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    /// Shareable link that opens the form with this session preselected.
    pub link: String,
    pub status: SessionStatus,
}

/// Request body for form submission.
#[derive(Debug, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Response for an accepted submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub session_id: String,
    /// Echo of the payload forwarded to the agent webhook.
    pub payload: SubmissionPayload,
}

/// Response for the session listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub count: usize,
    pub sessions: Vec<Session>,
}

/// POST /api/sessions - Create a new pending session.
async fn api_create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session = state.store.create();
    info!(name: "session.created", session_id = %session.id, "Session created");

    let link = format!("{}/?session={}", state.config.base_url(), session.id);
    Json(CreateSessionResponse {
        session_id: session.id,
        link,
        status: session.status,
    })
}

/// POST /api/submit - Accept the one submission for a session.
///
/// On success the agent webhook is notified on a detached task; the response
/// never waits on that delivery.
async fn api_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session_id = req
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| store_error(&SessionError::NotFound))?;

    let Session {
        id: session_id,
        filled_at: Some(timestamp),
        data: Some(data),
        ..
    } = state
        .store
        .fill(&session_id, req.data)
        .map_err(|e| store_error(&e))?
    else {
        return Err(store_error(&SessionError::NotFound));
    };

    info!(
        name: "session.filled",
        session_id = %session_id,
        "Session filled"
    );

    let payload = SubmissionPayload::form_submitted(session_id.clone(), timestamp, data);
    state.notifier.notify(payload.clone());

    Ok(Json(SubmitResponse {
        success: true,
        session_id,
        payload,
    }))
}

/// GET /api/sessions/{id} - Fetch a full session record.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .store
        .get(&id)
        .map(Json)
        .map_err(|e| store_error(&e))
}

/// GET /api/sessions - List all live sessions, newest first.
async fn api_list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let sessions = state.store.list();
    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    })
}
