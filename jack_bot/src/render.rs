use std::{collections::HashMap, fmt, time::Duration};

use itertools::Itertools;
use jack_core::{EventEntry, GameConfig, GameEvent, Outcome, PlayerId, Suit};

pub const TITLE: &str = "JACK OF HEARTS";

pub type Names = HashMap<PlayerId, String>;

#[derive(Clone, Debug)]
pub struct GuildHeader {
    pub name: String,
    pub id: u64,
}

impl fmt::Display for GuildHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{TITLE} (server: {}, id: {})**", self.name, self.id)
    }
}

pub fn minutes(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

fn name(names: &Names, player: PlayerId) -> String {
    names
        .get(&player)
        .cloned()
        .unwrap_or_else(|| format!("<@{player}>"))
}

fn list(names: &Names, players: &[PlayerId]) -> String {
    format!(
        "{} ({})",
        players.len(),
        players.iter().map(|&p| name(names, p)).join(", ")
    )
}

pub fn event(entry: &EventEntry, names: &Names, header: &GuildHeader) -> String {
    match &entry.event {
        GameEvent::GameStarted => format!("{header}\nGame start!"),
        GameEvent::JackAssigned => format!("{header}\nYou are the Jack of Hearts!"),
        GameEvent::RoundStarted {
            round,
            alive,
            discussion,
        } => format!(
            "**ROUND {round}**\nAlive: {}\nYou are now in the **DISCUSSION STAGE** for {}. \
             Please discuss with your fellow players to find the **JACK OF HEARTS**.",
            list(names, alive),
            minutes(*discussion)
        ),
        GameEvent::AnswerStageStarted { answer, .. } => format!(
            "**{TITLE}**\nYou are now in the **ANSWER STAGE**. Please check your DMs. \
             You have {} to react to my message with your guess!",
            minutes(*answer)
        ),
        GameEvent::GuessCorrect { player, round } => format!(
            "**CORRECT!**\n{} survived round {round}!",
            name(names, *player)
        ),
        GameEvent::GuessWrong {
            player,
            guess,
            suit,
        } => format!(
            "**GAME OVER**\n{} guessed {} but your suit was {}. You died!",
            name(names, *player),
            guess.glyph(),
            suit.glyph()
        ),
        GameEvent::TimedOut(player) => format!(
            "**GAME OVER**\n{} failed to guess in time and died.",
            name(names, *player)
        ),
        GameEvent::PlayerDied(player, _) => format!("**{} died!**", name(names, *player)),
        GameEvent::GameOver {
            outcome,
            jack,
            alive,
        } => {
            let jack = name(names, *jack);
            match outcome {
                Outcome::PlayersWin => format!(
                    "**GAME OVER**\nThe Jack of Hearts ({jack}) is dead. Players win!\nAlive: {}",
                    list(names, alive)
                ),
                Outcome::EveryoneDead => format!(
                    "**GAME OVER**\nEveryone is dead :(\nThe JACK OF HEARTS was: {jack}\nAlive: 0"
                ),
                Outcome::JackWins => format!(
                    "**GAME OVER**\nThe Jack of Hearts ({jack}) wins!\nAlive: {}",
                    list(names, alive)
                ),
            }
        }
        GameEvent::Unresolved { alive } => format!(
            "**GAME OVER**\nUnexpected game over condition.\nAlive: {}",
            list(names, alive)
        ),
    }
}

pub fn guess_prompt(header: &GuildHeader, round: u32, answer: Duration) -> String {
    format!(
        "{header}\nRound: {round}\nTime limit: {}\n\
         Please react to this message within the time limit with your guess for your suit!",
        minutes(answer)
    )
}

pub fn suits(header: &GuildHeader, round: u32, others: &[(String, Suit)]) -> String {
    let rows = others
        .iter()
        .map(|(name, suit)| format!("{name}: {} ({suit})", suit.glyph()))
        .join("\n");
    format!("{header}\nRound: {round}\n```\n{rows}\n```")
}

pub fn lobby_opened(host: &str, config: &GameConfig, count: usize, roster: &str) -> String {
    format!(
        "**{TITLE}**\n{host} started a new game!\n\
         Discussion stage: {}\nAnswer stage: {}\n\
         Please use the `join` command to join the game.\n\n\
         Current players: {count} ({roster})",
        minutes(config.discussion()),
        minutes(config.answer())
    )
}

pub fn joined(player: &str, count: usize, roster: &str) -> String {
    format!("{player} joined the game.\nCurrent players: {count} ({roster})")
}

pub fn left(player: &str, count: usize, roster: &str) -> String {
    format!("{player} left the game.\nCurrent players: {count} ({roster})")
}

pub fn host_changed(previous: &str, next: &str) -> String {
    format!("The previous game host {previous} left the game, the new host is: {next}")
}

pub fn game_started(host: &str, header: &GuildHeader, prefix: &str) -> String {
    format!(
        "**GAME START**\n{host} started the game in server {} (id: {})!\n\
         DM me with `{prefix}show {}` to get a list of other players' suits excluding your own.",
        header.name, header.id, header.id
    )
}

pub fn show_usage(prefix: &str) -> String {
    format!("Usage: `{prefix}show <guild_id>`")
}

pub fn show_in_dm_only(prefix: &str, guild: u64) -> String {
    format!(
        "This command can only be used in DM! Please DM me with `{prefix}show {guild}` \
         to get a list of other players' suits excluding your own."
    )
}
