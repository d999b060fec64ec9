use std::{future::Future, pin::pin, time::Duration};

use async_trait::async_trait;
use jack_core::{EventEntry, EventVisibility, PlayerId, Suit, Table};
use log::{debug, warn};
use poise::{
    futures_util::{Stream, StreamExt},
    serenity_prelude as serenity,
};
use tokio::time::Instant;

use crate::render::{self, GuildHeader, Names};

pub struct DiscordTable {
    ctx: serenity::Context,
    channel: serenity::ChannelId,
    header: GuildHeader,
    names: Names,
    answer: Duration,
}

impl DiscordTable {
    pub fn new(
        ctx: serenity::Context,
        channel: serenity::ChannelId,
        header: GuildHeader,
        names: Names,
        answer: Duration,
    ) -> Self {
        DiscordTable {
            ctx,
            channel,
            header,
            names,
            answer,
        }
    }

    async fn dm(&self, player: PlayerId, text: String) -> serenity::Result<serenity::Message> {
        let channel = serenity::UserId::new(player)
            .create_dm_channel(&self.ctx)
            .await?;
        channel.id.say(&self.ctx.http, text).await
    }

    async fn ask(
        &self,
        player: PlayerId,
        round: u32,
        deadline: Instant,
    ) -> serenity::Result<Option<Suit>> {
        let prompt = self
            .dm(player, render::guess_prompt(&self.header, round, self.answer))
            .await?;
        let reactions = prompt
            .await_reaction(&self.ctx)
            .author_id(serenity::UserId::new(player))
            .timeout(deadline.saturating_duration_since(Instant::now()))
            .filter(|reaction| suit_of(&reaction.emoji).is_some())
            .stream()
            .map(|reaction| reaction.emoji);
        let decorate = async {
            for glyph in Suit::glyphs() {
                if let Err(e) = prompt
                    .react(&self.ctx, serenity::ReactionType::Unicode(glyph.to_string()))
                    .await
                {
                    warn!("guild {}: could not add {glyph} for {player}: {e}", self.header.id);
                }
            }
        };
        Ok(first_suit(reactions, decorate).await)
    }
}

/// `reactions` must already be subscribed: clicks made while `decorate` adds
/// the glyphs are kept.
async fn first_suit<S, F>(reactions: S, decorate: F) -> Option<Suit>
where
    S: Stream<Item = serenity::ReactionType>,
    F: Future<Output = ()>,
{
    let mut suits = pin!(reactions.filter_map(|emoji| async move { suit_of(&emoji) }));
    decorate.await;
    suits.next().await
}

/// Clients may send the emoji presentation of a glyph (with a trailing
/// variation selector).
fn suit_of(emoji: &serenity::ReactionType) -> Option<Suit> {
    match emoji {
        serenity::ReactionType::Unicode(glyph) => {
            Suit::from_glyph(glyph.trim_end_matches('\u{FE0F}'))
        }
        _ => None,
    }
}

#[async_trait]
impl Table for DiscordTable {
    async fn announce(&self, entry: &EventEntry) {
        if let Ok(json) = serde_json::to_string(entry) {
            debug!("guild {}: {json}", self.header.id);
        }
        let text = render::event(entry, &self.names, &self.header);
        let sent = match entry.visibility {
            EventVisibility::Public => self.channel.say(&self.ctx.http, text).await,
            EventVisibility::Private(player) => self.dm(player, text).await,
        };
        if let Err(e) = sent {
            warn!(
                "guild {}: could not deliver {:?}: {e}",
                self.header.id, entry.visibility
            );
        }
    }

    async fn collect_guess(
        &self,
        player: PlayerId,
        round: u32,
        deadline: Instant,
    ) -> Option<Suit> {
        match self.ask(player, round, deadline).await {
            Ok(guess) => guess,
            Err(e) => {
                warn!(
                    "guild {}: could not ask {player} for a guess: {e}",
                    self.header.id
                );
                None
            }
        }
    }
}
