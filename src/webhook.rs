//! Best-effort webhook delivery for accepted submissions.
//!
//! Every successful submission produces one POST to the configured agent
//! endpoint. Delivery is fire-and-forget: the submitter's response never
//! waits on it, failures are logged and never retried, and an unconfigured
//! endpoint disables the call entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

/// Payload POSTed to the agent webhook after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Always `"form_submitted"`.
    pub event: String,
    pub session_id: String,
    /// Moment the submission was accepted (the session's `filledAt`).
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl SubmissionPayload {
    #[must_use]
    pub fn form_submitted(session_id: String, timestamp: DateTime<Utc>, data: Value) -> Self {
        Self {
            event: "form_submitted".to_string(),
            session_id,
            timestamp,
            data,
        }
    }
}

/// Notifies the externally configured agent endpoint of submissions.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a notifier. `None` makes [`WebhookNotifier::notify`] a no-op.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Deliver the payload on a detached task.
    ///
    /// Returns immediately; the HTTP call runs in the background and its
    /// outcome is only observable in the logs.
    pub fn notify(&self, payload: SubmissionPayload) {
        let Some(url) = self.url.clone() else {
            debug!(
                name: "webhook.skipped",
                session_id = %payload.session_id,
                "No agent webhook configured, skipping delivery"
            );
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) => {
                    info!(
                        name: "webhook.delivered",
                        session_id = %payload.session_id,
                        status = %response.status(),
                        "Agent webhook notified"
                    );
                }
                Err(e) => {
                    error!(
                        name: "webhook.failed",
                        session_id = %payload.session_id,
                        error = %e,
                        "Agent webhook delivery failed"
                    );
                }
            }
        });
    }
}
