//! Level-up notification dispatcher.
//!
//! [`LevelUpDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and, for every [`LevelUpNotice`], performs two independent deliveries:
//! the guild log-channel announcement (when a log channel is configured) and
//! the owner DM. Each delivery is bounded by a timeout. Failures are logged
//! and never propagated; the XP award that produced the notice is already
//! committed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinSet};

use crate::bus::LevelUpNotice;
use crate::delivery::LevelUpDelivery;

/// Default bound on a single delivery attempt.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Not attempted (no log channel configured).
    Skipped,
    Failed(String),
    TimedOut,
}

/// Outcomes of both deliveries for one notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub channel: DeliveryOutcome,
    pub direct_message: DeliveryOutcome,
}

// ---------------------------------------------------------------------------
// LevelUpDispatcher
// ---------------------------------------------------------------------------

/// Fans level-up notices out to the configured delivery transport.
#[derive(Clone)]
pub struct LevelUpDispatcher {
    delivery: Arc<dyn LevelUpDelivery>,
    timeout: Duration,
}

impl LevelUpDispatcher {
    pub fn new(delivery: Arc<dyn LevelUpDelivery>) -> Self {
        Self {
            delivery,
            timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the dispatch loop until the bus is closed.
    ///
    /// Each notice is delivered on its own task so a slow recipient does not
    /// hold up later notices. Once the bus closes, the deliveries still in
    /// flight are awaited before returning.
    pub async fn run(self, mut receiver: broadcast::Receiver<LevelUpNotice>) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_join_error(joined);
                }
                received = receiver.recv() => match received {
                    Ok(notice) => {
                        let dispatcher = self.clone();
                        in_flight.spawn(async move {
                            dispatcher.dispatch(&notice).await;
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            "Level-up dispatcher lagged, some notifications were not sent"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        tracing::info!(
            in_flight = in_flight.len(),
            "Event bus closed, draining level-up deliveries"
        );
        while let Some(joined) = in_flight.join_next().await {
            log_join_error(joined);
        }
        tracing::info!("Level-up dispatcher stopped");
    }

    /// Deliver one notice to the log channel and the owner concurrently.
    pub async fn dispatch(&self, notice: &LevelUpNotice) -> DispatchReport {
        let (channel, direct_message) =
            tokio::join!(self.announce_in_channel(notice), self.notify_owner(notice));
        DispatchReport {
            channel,
            direct_message,
        }
    }

    async fn announce_in_channel(&self, notice: &LevelUpNotice) -> DeliveryOutcome {
        let Some(channel_id) = notice.log_channel_id else {
            return DeliveryOutcome::Skipped;
        };

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.delivery.post_to_channel(channel_id, notice),
        )
        .await
        {
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
            Err(_) => DeliveryOutcome::TimedOut,
        };

        match &outcome {
            DeliveryOutcome::Delivered => tracing::info!(
                channel_id,
                character = %notice.character_name,
                new_level = notice.new_level,
                "Posted level-up notification to log channel"
            ),
            DeliveryOutcome::Failed(error) => tracing::error!(
                channel_id,
                character = %notice.character_name,
                error = %error,
                "Failed to post level-up notification"
            ),
            DeliveryOutcome::TimedOut => tracing::error!(
                channel_id,
                character = %notice.character_name,
                timeout_secs = self.timeout.as_secs(),
                "Level-up notification to log channel timed out"
            ),
            DeliveryOutcome::Skipped => {}
        }
        outcome
    }

    async fn notify_owner(&self, notice: &LevelUpNotice) -> DeliveryOutcome {
        let owner_id = notice.owner_id;
        let outcome = match tokio::time::timeout(
            self.timeout,
            self.delivery.direct_message(owner_id, notice),
        )
        .await
        {
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
            Err(_) => DeliveryOutcome::TimedOut,
        };

        match &outcome {
            DeliveryOutcome::Delivered => {
                tracing::info!(user_id = owner_id, "Sent level-up DM");
            }
            DeliveryOutcome::Failed(error) => tracing::warn!(
                user_id = owner_id,
                error = %error,
                "Could not send level-up DM"
            ),
            DeliveryOutcome::TimedOut => tracing::warn!(
                user_id = owner_id,
                timeout_secs = self.timeout.as_secs(),
                "Level-up DM timed out"
            ),
            DeliveryOutcome::Skipped => {}
        }
        outcome
    }
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Level-up delivery task failed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
