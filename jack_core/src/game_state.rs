use itertools::Itertools;
use rand::Rng;
use serde::Serialize;
use strum_macros::Display;

use crate::{
    config::GameConfig,
    error::GameError,
    player::{Player, PlayerId},
    utils::PlayerSliceExtensions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Stage {
    #[strum(serialize = "not started")]
    NotStarted,
    #[strum(serialize = "discussion")]
    Discussion,
    #[strum(serialize = "answer")]
    Answer,
    #[strum(serialize = "game over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The jack died with at least two players left standing.
    PlayersWin,
    EveryoneDead,
    JackWins,
}

impl Outcome {
    pub fn players_win(&self) -> bool {
        matches!(self, Outcome::PlayersWin)
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) host: PlayerId,
    pub(crate) jack: Option<PlayerId>,
    pub(crate) round: u32,
    pub(crate) stage: Stage,
    pub(crate) player_win: bool,
    pub(crate) config: GameConfig,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(
        host: PlayerId,
        host_name: String,
        config: GameConfig,
        rng: &mut R,
    ) -> Self {
        Game {
            players: vec![Player::new(host, host_name, rng)],
            host,
            jack: None,
            round: 0,
            stage: Stage::NotStarted,
            player_win: false,
            config,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id()).collect()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players.by_id(id).ok_or(GameError::PlayerNotFound(id))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.by_id(id).is_some()
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn host_name(&self) -> &str {
        self.players.by_id(self.host).map_or("?", |p| p.name())
    }

    pub fn jack(&self) -> Option<PlayerId> {
        self.jack
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn player_win(&self) -> bool {
        self.player_win
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.alive().collect()
    }

    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.alive_players().iter().map(|p| p.id()).collect()
    }

    pub fn roster(&self) -> String {
        self.players.iter().map(|p| p.name()).join(", ")
    }

    pub fn alive_count(&self) -> usize {
        self.players.alive().count()
    }

    pub fn is_jack_alive(&self) -> Result<bool, GameError> {
        let jack = self.jack.ok_or(GameError::NoJack)?;
        Ok(self.player(jack)?.is_alive())
    }

    /// Whether another round is played: the jack lives and more than two
    /// players remain.
    pub fn should_continue(&self) -> bool {
        self.is_jack_alive().unwrap_or(false) && self.alive_count() > 2
    }

    pub fn ensure_host(&self, id: PlayerId) -> Result<(), GameError> {
        if id == self.host {
            Ok(())
        } else {
            Err(GameError::NotHost {
                host: self.host_name().to_string(),
            })
        }
    }

    pub fn ensure_stage(&self, expected: Stage) -> Result<(), GameError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(GameError::WrongState {
                expected,
                actual: self.stage,
            })
        }
    }

    pub fn suits_visible_to(&self, viewer: PlayerId) -> Result<Vec<&Player>, GameError> {
        self.player(viewer)?;
        self.ensure_stage(Stage::Discussion)?;
        let mut others = self.alive_players();
        others.retain(|p| p.id() != viewer);
        Ok(others)
    }

    /// Decides the winner once the loop has stopped. The rules are checked in
    /// order and the first match wins.
    pub fn outcome(&self) -> Result<Outcome, GameError> {
        let jack_alive = self.is_jack_alive()?;
        let alive = self.alive_count();
        if !jack_alive && alive >= 2 {
            Ok(Outcome::PlayersWin)
        } else if alive == 0 {
            Ok(Outcome::EveryoneDead)
        } else if jack_alive && alive <= 2 {
            Ok(Outcome::JackWins)
        } else {
            Err(GameError::UnresolvedOutcome { alive, jack_alive })
        }
    }
}
