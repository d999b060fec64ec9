use async_trait::async_trait;
use tokio::time::Instant;

use crate::{events::EventEntry, player::PlayerId, suit::Suit};

#[async_trait]
pub trait Table: Send + Sync {
    /// Posts an event to the guild channel or to one player. Failures are the
    /// implementation's to log.
    async fn announce(&self, entry: &EventEntry);

    async fn collect_guess(&self, player: PlayerId, round: u32, deadline: Instant)
        -> Option<Suit>;
}
