//! formrelay
//!
//! A minimal session-relay backend for a form-filling flow: issues
//! short-lived session tokens, accepts exactly one submission per session,
//! forwards accepted payloads to an external agent webhook, and expires
//! sessions after a fixed TTL.
//!
//! # Architecture
//!
//! - **Session store**: process-local, in-memory, the single source of truth
//! - **HTTP layer**: thin Axum adapters over the store
//! - **Webhook**: best-effort fire-and-forget delivery, logged only
//! - **Sweep**: periodic background purge of expired sessions
//!
//! # Modules
//!
//! - [`config`]: configuration layering (defaults, file, env, CLI)
//! - [`server`]: router, handlers, sweeper, startup
//! - [`session`]: session records and the thread-safe store
//! - [`webhook`]: submission payloads and delivery

pub mod config;
pub mod server;
pub mod session;
pub mod webhook;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::webhook::WebhookNotifier;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session store, the authoritative session map.
    pub store: SessionStore,
    /// Agent webhook notifier (inert when unconfigured).
    pub notifier: WebhookNotifier,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
