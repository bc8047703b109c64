use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::mailer::Mailer;
use crate::store::GymStore;
use crate::utils::AppResult;

const BATCH_SIZE: i64 = 50;

/// Wakes the dispatcher after a commit leaves rows in the outbox.
#[derive(Clone, Default)]
pub struct OutboxSignal(Arc<Notify>);

impl OutboxSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        self.0.notify_one();
    }

    async fn woken(&self) {
        self.0.notified().await;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub sent: usize,
    pub failed: usize,
}

/// Delivers pending `email_logs` rows. A failed send is recorded on the
/// row and never retried.
pub struct EmailDispatcher {
    store: Arc<dyn GymStore>,
    mailer: Arc<dyn Mailer>,
    signal: OutboxSignal,
    interval: Duration,
}

impl EmailDispatcher {
    pub fn new(
        store: Arc<dyn GymStore>,
        mailer: Arc<dyn Mailer>,
        signal: OutboxSignal,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            mailer,
            signal,
            interval,
        }
    }

    /// Sends one batch of pending emails.
    pub async fn drain(&self) -> AppResult<DrainReport> {
        let pending = self.store.claim_pending_emails(BATCH_SIZE).await?;
        let mut report = DrainReport::default();

        for email in &pending {
            let result = self.mailer.send(email).await.map_err(|e| e.to_string());
            match &result {
                Ok(()) => report.sent += 1,
                Err(reason) => {
                    tracing::warn!(
                        email_id = %email.id,
                        to = %email.recipient,
                        error = %reason,
                        "Email delivery failed"
                    );
                    report.failed += 1;
                }
            }
            self.store
                .record_email_result(email.id, result, Utc::now())
                .await?;
        }

        if pending.len() as i64 == BATCH_SIZE {
            self.signal.wake();
        }
        Ok(report)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(interval_secs = self.interval.as_secs(), "Email dispatcher started");
            loop {
                tokio::select! {
                    _ = self.signal.woken() => {}
                    _ = tokio::time::sleep(self.interval) => {}
                }
                match self.drain().await {
                    Ok(report) if report.sent + report.failed > 0 => {
                        tracing::info!(
                            sent = report.sent,
                            failed = report.failed,
                            "Email outbox drained"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Email outbox drain failed"),
                }
            }
        })
    }
}
