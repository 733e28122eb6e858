//! Background relay of pending reviews.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::relay::{Relay, RelayOutcome};
use crate::models::{Review, ReviewId};
use crate::store::ReviewService;

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Counters for one pass over the pending reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Pending reviews left alone: already synced, deleted mid-sweep, or out of attempts.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Delivered(ReviewId),
    Failed {
        id: ReviewId,
        outcome: RelayOutcome,
        attempts: u32,
    },
    /// The review reached the attempt limit and is no longer swept.
    GaveUp(ReviewId),
    SweepFinished(SweepReport),
}

/// Relays reviews and records confirmed deliveries in the store.
#[derive(Clone)]
pub struct SyncAgent {
    service: ReviewService,
    relay: Arc<dyn Relay>,
    max_attempts: u32,
    attempts: Arc<Mutex<HashMap<ReviewId, u32>>>,
    events: Option<mpsc::UnboundedSender<SyncEvent>>,
}

impl SyncAgent {
    pub fn new(service: ReviewService, relay: Arc<dyn Relay>) -> Self {
        Self {
            service,
            relay,
            max_attempts: 0,
            attempts: Arc::new(Mutex::new(HashMap::new())),
            events: None,
        }
    }

    /// Stop sweeping a review after this many failed attempts. `0` never gives up.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Relay one review and set its `synced` flag on confirmed delivery.
    ///
    /// Reviews already marked synced are not sent again.
    pub async fn relay(&self, review: &Review) -> RelayOutcome {
        if review.synced {
            return RelayOutcome::Delivered;
        }

        let outcome = self.relay.relay(review).await;
        if outcome.is_delivered() {
            self.attempts.lock().await.remove(&review.id);
            match self.service.set_sync_flag(review.id, true).await {
                Ok(true) => tracing::debug!(id = %review.id, "Review relayed"),
                Ok(false) => tracing::debug!(id = %review.id, "Relayed review no longer stored"),
                Err(error) => {
                    tracing::warn!(id = %review.id, "Failed to record relay delivery: {}", error);
                }
            }
            self.emit(SyncEvent::Delivered(review.id));
            return outcome;
        }

        let attempts = {
            let mut attempts = self.attempts.lock().await;
            let count = attempts.entry(review.id).or_insert(0);
            *count = count.saturating_add(1);
            *count
        };
        tracing::warn!(id = %review.id, attempts, "Review relay failed: {}", outcome);
        self.emit(SyncEvent::Failed {
            id: review.id,
            outcome: outcome.clone(),
            attempts,
        });
        if self.max_attempts > 0 && attempts == self.max_attempts {
            tracing::warn!(id = %review.id, attempts, "Giving up on review relay");
            self.emit(SyncEvent::GaveUp(review.id));
        }
        outcome
    }

    /// Fire-and-forget relay used right after a review is written.
    pub fn relay_in_background(&self, review: Review) -> JoinHandle<RelayOutcome> {
        let agent = self.clone();
        tokio::spawn(async move { agent.relay(&review).await })
    }

    /// Try every pending review once.
    pub async fn sweep_pending(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let pending = self.service.pending().await;

        // Forget counts for reviews that were deleted or cleared.
        self.attempts
            .lock()
            .await
            .retain(|id, _| pending.iter().any(|review| review.id == *id));

        for candidate in pending {
            if self.exhausted(candidate.id).await {
                report.skipped += 1;
                continue;
            }

            // A foreground relay may have finished since the pending snapshot.
            let Some(current) = self.service.get(candidate.id).await else {
                self.attempts.lock().await.remove(&candidate.id);
                report.skipped += 1;
                continue;
            };
            if current.synced {
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            if self.relay(&current).await.is_delivered() {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                delivered = report.delivered,
                failed = report.failed,
                "Relay sweep finished"
            );
        }
        report
    }

    /// Start the periodic sweep. The first sweep runs immediately.
    pub fn spawn(mut self, interval: Duration) -> SyncHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        self.events = Some(events_tx);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let report = self.sweep_pending().await;
                        self.emit(SyncEvent::SweepFinished(report));
                    }
                }
            }
            tracing::debug!("Relay sweeper stopped");
        });

        SyncHandle {
            events: events_rx,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn exhausted(&self, id: ReviewId) -> bool {
        if self.max_attempts == 0 {
            return false;
        }
        self.attempts
            .lock()
            .await
            .get(&id)
            .is_some_and(|count| *count >= self.max_attempts)
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Owner side of a running sweeper.
pub struct SyncHandle {
    events: mpsc::UnboundedReceiver<SyncEvent>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    /// Stop the sweeper and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.task.await {
            tracing::warn!("Relay sweeper task failed: {}", error);
        }
    }
}
