pub mod config;
pub mod error;
pub mod events;
mod game_logic;
pub mod game_state;
pub mod player;
pub mod round_loop;
pub mod sessions;
pub mod suit;
pub mod table;
pub mod utils;

pub use config::GameConfig;
pub use error::{ConfigError, GameError};
pub use events::{DeathCause, EventEntry, EventVisibility, GameEvent};
pub use game_state::{Game, Outcome, Stage};
pub use player::{Player, PlayerId};
pub use round_loop::run_game;
pub use sessions::{GuildKey, SessionId, SessionStore};
pub use suit::Suit;
pub use table::Table;
