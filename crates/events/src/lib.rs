//! Level-up event bus and notification delivery.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`LevelUpNotice`] -- the event published after a committed level-up.
//! - [`LevelUpDispatcher`] -- background task that fans each notice out to
//!   the log channel and the character owner.
//! - [`delivery`] -- the [`LevelUpDelivery`] seam and its Discord
//!   implementation.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{EventBus, LevelUpNotice};
pub use delivery::discord::DiscordDelivery;
pub use delivery::{DeliveryError, LevelUpDelivery};
pub use dispatcher::{DeliveryOutcome, DispatchReport, LevelUpDispatcher};
