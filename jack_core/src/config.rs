use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, game_state::Stage};

pub const SECONDS_IN_MINUTE: u64 = 60;
pub const DEFAULT_DISCUSSION_MINUTES: u64 = 3;
pub const DEFAULT_ANSWER_MINUTES: u64 = 1;
pub const MAXIMUM_STAGE_MINUTES: u64 = 24 * 60;
/// With fewer players the first round would already be decided.
pub const MINIMUM_PLAYERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    discussion: Duration,
    answer: Duration,
    min_players: usize,
}

impl GameConfig {
    pub fn new(
        discussion: Duration,
        answer: Duration,
        min_players: usize,
    ) -> Result<Self, ConfigError> {
        if min_players < MINIMUM_PLAYERS {
            return Err(ConfigError::TooFewPlayers {
                floor: MINIMUM_PLAYERS,
                actual: min_players,
            });
        }
        if discussion.is_zero() {
            return Err(ConfigError::EmptyStage(Stage::Discussion));
        }
        if answer.is_zero() {
            return Err(ConfigError::EmptyStage(Stage::Answer));
        }
        for (stage, length) in [(Stage::Discussion, discussion), (Stage::Answer, answer)] {
            if length > minutes(MAXIMUM_STAGE_MINUTES) {
                return Err(ConfigError::StageTooLong {
                    stage,
                    max_minutes: MAXIMUM_STAGE_MINUTES,
                });
            }
        }
        Ok(GameConfig {
            discussion,
            answer,
            min_players,
        })
    }

    pub fn from_minutes(
        discussion_minutes: u64,
        answer_minutes: u64,
        min_players: usize,
    ) -> Result<Self, ConfigError> {
        GameConfig::new(
            minutes(discussion_minutes),
            minutes(answer_minutes),
            min_players,
        )
    }

    pub fn discussion(&self) -> Duration {
        self.discussion
    }

    pub fn answer(&self) -> Duration {
        self.answer
    }

    pub fn min_players(&self) -> usize {
        self.min_players
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            discussion: minutes(DEFAULT_DISCUSSION_MINUTES),
            answer: minutes(DEFAULT_ANSWER_MINUTES),
            min_players: MINIMUM_PLAYERS,
        }
    }
}

pub fn minutes(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(SECONDS_IN_MINUTE))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        config::{GameConfig, MAXIMUM_STAGE_MINUTES, MINIMUM_PLAYERS},
        error::ConfigError,
        game_state::Stage,
    };

    #[test]
    fn from_minutes_should_convert_to_durations() {
        let config = GameConfig::from_minutes(5, 2, 4).unwrap();

        assert_eq!(config.discussion(), Duration::from_secs(300));
        assert_eq!(config.answer(), Duration::from_secs(120));
        assert_eq!(config.min_players(), 4);
    }

    #[test]
    fn new_should_reject_player_floor_below_three() {
        assert_eq!(
            GameConfig::from_minutes(1, 1, 2),
            Err(ConfigError::TooFewPlayers {
                floor: MINIMUM_PLAYERS,
                actual: 2
            })
        );
    }

    #[test]
    fn new_should_reject_empty_stages() {
        assert_eq!(
            GameConfig::from_minutes(0, 1, 3),
            Err(ConfigError::EmptyStage(Stage::Discussion))
        );
        assert_eq!(
            GameConfig::from_minutes(1, 0, 3),
            Err(ConfigError::EmptyStage(Stage::Answer))
        );
    }

    #[test]
    fn new_should_reject_stages_longer_than_a_day() {
        assert_eq!(
            GameConfig::from_minutes(1, u64::MAX, 3),
            Err(ConfigError::StageTooLong {
                stage: Stage::Answer,
                max_minutes: MAXIMUM_STAGE_MINUTES
            })
        );
        assert_eq!(
            GameConfig::from_minutes(160_000_000_000_000_000, 1, 3),
            Err(ConfigError::StageTooLong {
                stage: Stage::Discussion,
                max_minutes: MAXIMUM_STAGE_MINUTES
            })
        );
        assert!(GameConfig::from_minutes(MAXIMUM_STAGE_MINUTES, 1, 3).is_ok());
    }
}
