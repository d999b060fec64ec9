use thiserror::Error;

use crate::{game_state::Stage, player::PlayerId};

/// Rejected game operations. The message is shown to the user who issued the
/// command, so it is phrased for them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No active game is happening in this server.")]
    NoActiveGame,
    #[error(
        "Another game is already happening in this server. Wait for it to finish, \
         or ask the host to use the `stop` command."
    )]
    AlreadyRunning,
    #[error("Player {0} is already in this game.")]
    AlreadyJoined(String),
    #[error("Player {0} is not part of this game.")]
    PlayerNotFound(PlayerId),
    #[error("Only the host of the game ({host}) can do that.")]
    NotHost { host: String },
    #[error("This can only be done during the {expected} stage, the game is in the {actual} stage.")]
    WrongState { expected: Stage, actual: Stage },
    #[error("The game cannot be started without at least {required} players ({actual} joined).")]
    NotEnoughPlayers { required: usize, actual: usize },
    #[error("Player {0} is already dead.")]
    PlayerDead(String),
    #[error("Player {0} already answered this round.")]
    AlreadyGuessed(String),
    #[error("The Jack of Hearts has not been chosen yet.")]
    NoJack,
    #[error("Unexpected game over condition ({alive} alive, jack alive: {jack_alive}).")]
    UnresolvedOutcome { alive: usize, jack_alive: bool },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least {floor} players are required, got {actual}")]
    TooFewPlayers { floor: usize, actual: usize },
    #[error("the {0} stage must last longer than zero")]
    EmptyStage(Stage),
    #[error("the {stage} stage can last at most {max_minutes} minutes")]
    StageTooLong { stage: Stage, max_minutes: u64 },
}
