use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::repository::{Mailer, OutboxRepository};
use crate::domain::types::{MailMessage, PendingOutboxEvent};
use crate::error::MarketplaceError;

/// Events claimed per poll.
const OUTBOX_BATCH: u64 = 32;

/// Upper bound on the retry delay.
const MAX_BACKOFF_SECS: i64 = 3600;

/// Delay before retry number `attempts`: 10s, 20s, 40s, ... capped at one hour.
pub fn backoff(attempts: i32) -> chrono::Duration {
    let exp = attempts.clamp(1, 16) as u32 - 1;
    let secs = 10i64.saturating_mul(1i64 << exp).min(MAX_BACKOFF_SECS);
    chrono::Duration::seconds(secs)
}

/// Background task draining `outbox_events` through a `Mailer`.
///
/// Run a single worker per database; rows are not locked while a message is sent.
pub struct OutboxWorker<R: OutboxRepository, M: Mailer> {
    pub repo: R,
    pub mailer: M,
    pub poll_interval: Duration,
    pub max_attempts: i32,
}

impl<R: OutboxRepository, M: Mailer> OutboxWorker<R, M> {
    pub async fn run(self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "outbox worker started");
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                error!(error = ?e, "outbox poll failed");
            }
        }
    }

    /// Deliver every due event once. Returns how many were delivered.
    pub async fn run_once(&self) -> Result<usize, MarketplaceError> {
        let events = self.repo.fetch_due(OUTBOX_BATCH).await?;
        let mut delivered = 0;
        for event in events {
            let attempts = event.attempts + 1;
            match self.deliver(&event).await {
                Ok(()) => {
                    self.repo.mark_processed(event.id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    let retry_at =
                        (attempts < self.max_attempts).then(|| Utc::now() + backoff(attempts));
                    if retry_at.is_some() {
                        warn!(id = %event.id, kind = %event.kind, attempts, error = %e, "outbox delivery failed, will retry");
                    } else {
                        error!(id = %event.id, kind = %event.kind, attempts, error = %e, "outbox delivery failed, giving up");
                    }
                    self.repo
                        .record_failure(event.id, attempts, &format!("{e:#}"), retry_at)
                        .await?;
                }
            }
        }
        Ok(delivered)
    }

    async fn deliver(&self, event: &PendingOutboxEvent) -> anyhow::Result<()> {
        let message: MailMessage =
            serde_json::from_value(event.payload.clone()).context("decode mail payload")?;
        self.mailer.send(&message).await
    }
}
