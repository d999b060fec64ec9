use std::time::Duration;

use serde::Serialize;

use crate::{game_state::Outcome, player::PlayerId, suit::Suit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DeathCause {
    WrongGuess,
    NoGuess,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GameEvent {
    GameStarted,
    JackAssigned,
    RoundStarted {
        round: u32,
        alive: Vec<PlayerId>,
        discussion: Duration,
    },
    AnswerStageStarted {
        round: u32,
        answer: Duration,
    },
    GuessCorrect {
        player: PlayerId,
        round: u32,
    },
    GuessWrong {
        player: PlayerId,
        guess: Suit,
        suit: Suit,
    },
    TimedOut(PlayerId),
    PlayerDied(PlayerId, DeathCause),
    GameOver {
        outcome: Outcome,
        jack: PlayerId,
        alive: Vec<PlayerId>,
    },
    Unresolved {
        alive: Vec<PlayerId>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventVisibility {
    /// The guild channel the game was started in.
    Public,
    /// A direct message to one player.
    Private(PlayerId),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventEntry {
    pub visibility: EventVisibility,
    pub event: GameEvent,
}

impl EventEntry {
    pub fn public(event: GameEvent) -> Self {
        EventEntry {
            visibility: EventVisibility::Public,
            event,
        }
    }

    pub fn private(player: PlayerId, event: GameEvent) -> Self {
        EventEntry {
            visibility: EventVisibility::Private(player),
            event,
        }
    }

    pub fn is_visible_to(&self, player: PlayerId) -> bool {
        match self.visibility {
            EventVisibility::Public => true,
            EventVisibility::Private(recipient) => recipient == player,
        }
    }
}
