use std::{fmt, str::FromStr};

use jack_core::{
    config::{DEFAULT_ANSWER_MINUTES, DEFAULT_DISCUSSION_MINUTES, MINIMUM_PLAYERS},
    GameConfig,
};
use thiserror::Error;

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const PREFIX_VAR: &str = "JACK_PREFIX";
pub const DISCUSSION_VAR: &str = "JACK_DISCUSSION_MINUTES";
pub const ANSWER_VAR: &str = "JACK_ANSWER_MINUTES";
pub const MIN_PLAYERS_VAR: &str = "JACK_MIN_PLAYERS";
pub const DEFAULT_PREFIX: &str = "!";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error(transparent)]
    Game(#[from] jack_core::ConfigError),
}

#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub prefix: String,
    pub game: GameConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        BotConfig::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let prefix = lookup(PREFIX_VAR)
            .filter(|prefix| !prefix.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        let game = GameConfig::from_minutes(
            parse_or(&lookup, DISCUSSION_VAR, DEFAULT_DISCUSSION_MINUTES)?,
            parse_or(&lookup, ANSWER_VAR, DEFAULT_ANSWER_MINUTES)?,
            parse_or(&lookup, MIN_PLAYERS_VAR, MINIMUM_PLAYERS)?,
        )?;
        Ok(BotConfig {
            token,
            prefix,
            game,
        })
    }
}

// the token stays out of logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("prefix", &self.prefix)
            .field("game", &self.game)
            .finish_non_exhaustive()
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
