use rand::Rng;
use serde::Serialize;

use crate::suit::Suit;

pub type PlayerId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    alive: bool,
    suit: Suit,
    guess: Option<Suit>,
}

impl Player {
    pub fn new<R: Rng + ?Sized>(id: PlayerId, name: String, rng: &mut R) -> Self {
        Player {
            id,
            name,
            alive: true,
            suit: Suit::random(rng),
            guess: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn guess(&self) -> Option<Suit> {
        self.guess
    }

    /// Deals a fresh suit for the next round. The guess is cleared first.
    pub fn reroll<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.guess = None;
        self.suit = Suit::random(rng);
    }

    pub fn submit_guess(&mut self, guess: Suit) {
        self.guess = Some(guess);
        if guess != self.suit {
            self.alive = false;
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use strum::IntoEnumIterator;

    use crate::{player::Player, suit::Suit};

    fn player() -> Player {
        Player::new(1, "Foo".to_string(), &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn new_player_should_be_alive_without_guess() {
        let player = player();

        assert!(player.is_alive());
        assert_eq!(player.guess(), None);
        assert_eq!(player.name(), "Foo");
    }

    #[test]
    fn reroll_should_clear_guess_and_keep_alive_flag() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = player();
        let suit = player.suit();
        player.submit_guess(suit);

        for _ in 0..20 {
            player.reroll(&mut rng);
            assert_eq!(player.guess(), None);
            assert!(Suit::iter().any(|s| s == player.suit()));
            assert!(player.is_alive());
        }
    }

    #[test]
    fn reroll_should_not_revive_dead_player() {
        let mut player = player();
        player.kill();
        player.reroll(&mut StdRng::seed_from_u64(5));

        assert!(!player.is_alive());
    }

    #[test]
    fn correct_guess_should_keep_player_alive() {
        let mut player = player();
        let suit = player.suit();
        player.submit_guess(suit);

        assert!(player.is_alive());
        assert_eq!(player.guess(), Some(suit));
    }

    #[test]
    fn wrong_guess_should_kill_player() {
        for wrong in Suit::iter() {
            let mut player = player();
            if wrong == player.suit() {
                continue;
            }
            player.submit_guess(wrong);

            assert!(!player.is_alive());
            assert_eq!(player.guess(), Some(wrong));
        }
    }
}
