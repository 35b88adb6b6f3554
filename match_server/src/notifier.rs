//! Notifier implementations for the server.
//!
//! [`WebhookNotifier`] hands every notification to an external push/SMS service as a JSON POST. When no webhook is
//! configured, [`LogNotifier`] writes notifications to the log instead.
use std::time::Duration;

use log::*;
use match_engine::{
    db_types::{GroupId, Match, MatchId, MatchStatus, UserId},
    events::{EventHooks, NotificationDispatcher, NotificationError, Notifier},
};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Serialize;

use crate::errors::ServerError;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WebhookPayload<'a> {
    MatchCreated { user_a: &'a UserId, user_b: &'a UserId, match_id: MatchId },
    InterestReceived { target: &'a UserId, group_id: &'a GroupId },
    MatchEnded { user_a: &'a UserId, user_b: &'a UserId, match_id: MatchId, status: MatchStatus },
}

#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, ServerError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not build the webhook client. {e}")))?;
        Ok(Self { url: url.to_string(), client })
    }

    async fn post(&self, payload: WebhookPayload<'_>) -> Result<(), NotificationError> {
        trace!("📣️ POST {} to {}", serde_json::to_string(&payload).unwrap_or_default(), self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Unreachable(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        let message = format!("{status} {message}");
        // Server errors and throttling are worth retrying. Anything else is final
        if status.is_server_error() || status.as_u16() == 429 {
            Err(NotificationError::Unreachable(message))
        } else {
            Err(NotificationError::Rejected(message))
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn notify_match(&self, user_a: &UserId, user_b: &UserId, match_id: MatchId) -> Result<(), NotificationError> {
        self.post(WebhookPayload::MatchCreated { user_a, user_b, match_id }).await
    }

    async fn notify_interest_received(&self, target: &UserId, group_id: &GroupId) -> Result<(), NotificationError> {
        self.post(WebhookPayload::InterestReceived { target, group_id }).await
    }

    async fn notify_match_ended(&self, ended: &Match) -> Result<(), NotificationError> {
        let payload = WebhookPayload::MatchEnded {
            user_a: &ended.user_a,
            user_b: &ended.user_b,
            match_id: ended.id,
            status: ended.status,
        };
        self.post(payload).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify_match(&self, user_a: &UserId, user_b: &UserId, match_id: MatchId) -> Result<(), NotificationError> {
        info!("📣️ {user_a} and {user_b} have matched ({match_id})");
        Ok(())
    }

    async fn notify_interest_received(&self, target: &UserId, group_id: &GroupId) -> Result<(), NotificationError> {
        info!("📣️ {target} has received a new interest in {group_id}");
        Ok(())
    }
}

/// Builds the notification hooks for the configured webhook, or log-only hooks when there is none.
pub fn notification_hooks(webhook_url: Option<&str>) -> Result<EventHooks, ServerError> {
    match webhook_url {
        Some(url) => {
            info!("📣️ Notifications will be sent to {url}");
            Ok(NotificationDispatcher::new(WebhookNotifier::new(url)?).into_hooks())
        },
        None => Ok(NotificationDispatcher::new(LogNotifier).into_hooks()),
    }
}
