use rand::{seq::SliceRandom, Rng};

use crate::{
    error::GameError,
    game_state::{Game, Outcome, Stage},
    player::{Player, PlayerId},
    suit::Suit,
    utils::{PlayerSliceExtensions, VecExtensions},
};

impl Game {
    pub fn add_player<R: Rng + ?Sized>(
        &mut self,
        id: PlayerId,
        name: String,
        rng: &mut R,
    ) -> Result<&Player, GameError> {
        self.ensure_stage(Stage::NotStarted)?;
        if self.contains(id) {
            return Err(GameError::AlreadyJoined(name));
        }
        self.players.push(Player::new(id, name, rng));
        self.player(id)
    }

    /// Removes a player before the start. If the host leaves, the earliest
    /// remaining joiner takes over.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, GameError> {
        self.ensure_stage(Stage::NotStarted)?;
        let removed = self
            .players
            .remove_first_where(|p| p.id() == id)
            .ok_or(GameError::PlayerNotFound(id))?;
        if removed.id() == self.host {
            if let Some(next) = self.players.first() {
                self.host = next.id();
            }
        }
        Ok(removed)
    }

    /// Picks the jack and begins the first round. Returns the jack.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        by: PlayerId,
        rng: &mut R,
    ) -> Result<PlayerId, GameError> {
        self.ensure_host(by)?;
        self.ensure_stage(Stage::NotStarted)?;
        let required = self.config.min_players();
        if self.players.len() < required {
            return Err(GameError::NotEnoughPlayers {
                required,
                actual: self.players.len(),
            });
        }
        let jack = self
            .players
            .choose(rng)
            .map(|p| p.id())
            .ok_or(GameError::NotEnoughPlayers {
                required,
                actual: 0,
            })?;
        self.jack = Some(jack);
        self.begin_round(rng)?;
        Ok(jack)
    }

    /// Next round: bumps the counter, deals new suits to the living and opens
    /// the discussion.
    pub fn begin_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u32, GameError> {
        match self.stage {
            Stage::NotStarted | Stage::Answer => {}
            actual => {
                return Err(GameError::WrongState {
                    expected: Stage::Answer,
                    actual,
                })
            }
        }
        if self.jack.is_none() {
            return Err(GameError::NoJack);
        }
        self.round += 1;
        for player in self.players.iter_mut().filter(|p| p.is_alive()) {
            player.reroll(rng);
        }
        self.stage = Stage::Discussion;
        Ok(self.round)
    }

    pub fn open_answers(&mut self) -> Result<Vec<PlayerId>, GameError> {
        self.ensure_stage(Stage::Discussion)?;
        self.stage = Stage::Answer;
        Ok(self.alive_ids())
    }

    pub fn submit_guess(&mut self, id: PlayerId, guess: Suit) -> Result<&Player, GameError> {
        self.ensure_stage(Stage::Answer)?;
        let player = self
            .players
            .by_id_mut(id)
            .ok_or(GameError::PlayerNotFound(id))?;
        if !player.is_alive() {
            return Err(GameError::PlayerDead(player.name().to_string()));
        }
        if player.guess().is_some() {
            return Err(GameError::AlreadyGuessed(player.name().to_string()));
        }
        player.submit_guess(guess);
        Ok(&*player)
    }

    pub fn kill_player(&mut self, id: PlayerId) -> Result<&Player, GameError> {
        let player = self
            .players
            .by_id_mut(id)
            .ok_or(GameError::PlayerNotFound(id))?;
        player.kill();
        Ok(&*player)
    }

    pub fn forfeit(&mut self, id: PlayerId) -> Result<&Player, GameError> {
        match self.stage {
            Stage::Discussion | Stage::Answer => {}
            actual => {
                return Err(GameError::WrongState {
                    expected: Stage::Discussion,
                    actual,
                })
            }
        }
        let player = self.player(id)?;
        if !player.is_alive() {
            return Err(GameError::PlayerDead(player.name().to_string()));
        }
        self.kill_player(id)
    }

    /// End of the answer stage: every living player without a guess dies.
    /// Returns the players this killed.
    pub fn kill_players_with_no_guess(&mut self) -> Vec<PlayerId> {
        self.players
            .iter_mut()
            .filter(|p| p.is_alive() && p.guess().is_none())
            .map(|p| {
                p.kill();
                p.id()
            })
            .collect()
    }

    pub fn resolve(&mut self) -> Result<Outcome, GameError> {
        let outcome = self.outcome();
        self.stage = Stage::GameOver;
        self.player_win = matches!(outcome, Ok(Outcome::PlayersWin));
        outcome
    }
}
