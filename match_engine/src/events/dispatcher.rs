//! Delivery of user notifications.
//!
//! The engine does not know how users are notified. A [`Notifier`] is the narrow interface to whatever does (push,
//! e-mail, a webhook). The [`NotificationDispatcher`] turns matching events into notifier calls, retrying failed
//! deliveries a bounded number of times. Delivery happens after the originating unit of work has committed, and a
//! delivery failure never affects it.
use std::{future::Future, sync::Arc, time::Duration};

use log::*;
use rand::Rng;
use thiserror::Error;

use crate::{
    db_types::{GroupId, Match, MatchId, UserId},
    events::{EventHooks, InterestReceivedEvent, MatchCreatedEvent, MatchEndedEvent},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("The notification was rejected: {0}")]
    Rejected(String),
    #[error("The notification service could not be reached: {0}")]
    Unreachable(String),
}

impl NotificationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Sends notifications to users.
///
/// `notify_interest_received` must never reveal who signalled the interest; it only receives the target and the
/// group.
pub trait Notifier: Send + Sync + 'static {
    fn notify_match(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        match_id: MatchId,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;

    fn notify_interest_received(
        &self,
        target: &UserId,
        group: &GroupId,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;

    /// Users are not told when a match ends, unless the notifier chooses otherwise.
    fn notify_match_ended(&self, _ended: &Match) -> impl Future<Output = Result<(), NotificationError>> + Send {
        async { Ok(()) }
    }
}

pub struct NotificationDispatcher<N> {
    notifier: Arc<N>,
    max_attempts: u32,
    backoff: Duration,
}

impl<N: Notifier> NotificationDispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier: Arc::new(notifier), max_attempts: 3, backoff: Duration::from_millis(250) }
    }

    /// Sets the retry policy. `max_attempts` is clamped to at least one. The delay before attempt `n` is
    /// `n * backoff` plus up to `backoff` of random jitter.
    pub fn with_retries(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Registers this dispatcher against the engine's match events.
    pub fn into_hooks(self) -> EventHooks {
        let dispatcher = Arc::new(self);
        let mut hooks = EventHooks::default();
        let d = Arc::clone(&dispatcher);
        hooks.on_match_created(move |ev: MatchCreatedEvent| {
            let d = Arc::clone(&d);
            Box::pin(async move { d.deliver_match(ev).await })
        });
        let d = Arc::clone(&dispatcher);
        hooks.on_interest_received(move |ev: InterestReceivedEvent| {
            let d = Arc::clone(&d);
            Box::pin(async move { d.deliver_interest_received(ev).await })
        });
        let d = dispatcher;
        hooks.on_match_ended(move |ev: MatchEndedEvent| {
            let d = Arc::clone(&d);
            Box::pin(async move { d.deliver_match_ended(ev).await })
        });
        hooks
    }

    pub async fn deliver_match(&self, ev: MatchCreatedEvent) {
        let m = &ev.matched;
        let what = format!("match {}", m.id);
        self.with_retry(&what, || self.notifier.notify_match(&m.user_a, &m.user_b, m.id)).await;
    }

    pub async fn deliver_interest_received(&self, ev: InterestReceivedEvent) {
        let what = format!("new interest for {} in {}", ev.target, ev.group_id);
        self.with_retry(&what, || self.notifier.notify_interest_received(&ev.target, &ev.group_id)).await;
    }

    pub async fn deliver_match_ended(&self, ev: MatchEndedEvent) {
        let what = format!("end of match {} ({:?})", ev.matched.id, ev.reason);
        self.with_retry(&what, || self.notifier.notify_match_ended(&ev.matched)).await;
    }

    async fn with_retry<F, Fut>(&self, what: &str, mut send: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), NotificationError>>,
    {
        for attempt in 1..=self.max_attempts {
            match send().await {
                Ok(()) => {
                    trace!("📣️ Notification for {what} delivered");
                    return;
                },
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let jitter_ms = rand::thread_rng().gen_range(0..=self.backoff.as_millis() as u64);
                    let delay = self.backoff * attempt + Duration::from_millis(jitter_ms);
                    debug!("📣️ Notification for {what} failed ({e}). Retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                },
                Err(e) => {
                    warn!("📣️ Notification for {what} was dropped after {attempt} attempt(s). {e}");
                    return;
                },
            }
        }
    }
}
