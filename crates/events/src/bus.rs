//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`LevelUpNotice`]s from the accrual path to the
//! notification dispatcher. It is shared via `Arc<EventBus>`; publishing
//! never blocks and never fails the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tavern_core::leveling::XpAwardResult;
use tavern_core::types::DiscordId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// LevelUpNotice
// ---------------------------------------------------------------------------

/// A committed level-up, with everything the notifications need to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUpNotice {
    pub guild_id: DiscordId,
    pub owner_id: DiscordId,
    pub character_name: String,
    pub old_level: i32,
    pub new_level: i32,
    pub new_total_xp: i64,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
    /// Guild log channel; `None` skips the channel announcement.
    pub log_channel_id: Option<DiscordId>,
    pub timestamp: DateTime<Utc>,
}

impl LevelUpNotice {
    /// Build a notice from an award result. Display metadata and the log
    /// channel are attached with the builder methods.
    pub fn new(
        guild_id: DiscordId,
        owner_id: DiscordId,
        character_name: impl Into<String>,
        award: &XpAwardResult,
    ) -> Self {
        Self {
            guild_id,
            owner_id,
            character_name: character_name.into(),
            old_level: award.old_level,
            new_level: award.new_level,
            new_total_xp: award.new_total_xp,
            character_sheet_url: None,
            image_url: None,
            log_channel_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_sheet_url(mut self, url: Option<String>) -> Self {
        self.character_sheet_url = url;
        self
    }

    pub fn with_image_url(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }

    pub fn with_log_channel(mut self, channel_id: Option<DiscordId>) -> Self {
        self.log_channel_id = channel_id;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use tavern_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
/// assert_eq!(bus.subscriber_count(), 1);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<LevelUpNotice>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed notices are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all current subscribers.
    ///
    /// With no subscribers the notice is dropped.
    pub fn publish(&self, notice: LevelUpNotice) {
        if self.sender.send(notice).is_err() {
            tracing::debug!("Level-up notice published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LevelUpNotice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn award() -> XpAwardResult {
        XpAwardResult {
            old_level: 1,
            new_level: 2,
            new_total_xp: 300,
            leveled_up: true,
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let notice = LevelUpNotice::new(1, 2, "Aria", &award())
            .with_sheet_url(Some("https://sheets.example/aria".into()))
            .with_log_channel(Some(77));
        bus.publish(notice);

        let received = rx.recv().await.expect("should receive the notice");
        assert_eq!(received.character_name, "Aria");
        assert_eq!(received.old_level, 1);
        assert_eq!(received.new_level, 2);
        assert_eq!(received.new_total_xp, 300);
        assert_eq!(received.log_channel_id, Some(77));
        assert!(received.image_url.is_none());
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_notice() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(LevelUpNotice::new(1, 2, "Bram", &award()));

        let n1 = rx1.recv().await.expect("subscriber 1 should receive");
        let n2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(n1, n2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(LevelUpNotice::new(1, 2, "Orphan", &award()));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
