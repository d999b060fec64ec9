use std::{collections::HashMap, sync::Arc};

use log::{debug, info};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{error::GameError, game_state::Game};

pub type GuildKey = u64;
pub type SessionId = u64;

struct Session {
    id: SessionId,
    game: Game,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Sessions {
    next_id: SessionId,
    by_guild: HashMap<GuildKey, Session>,
}

impl Sessions {
    fn take(&mut self, guild: GuildKey) -> Option<Game> {
        self.by_guild.remove(&guild).map(|s| {
            s.cancel.cancel();
            debug!("guild {guild}: closed session {}", s.id);
            s.game
        })
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Sessions>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub async fn open(&self, guild: GuildKey, game: Game) -> Result<SessionId, GameError> {
        let mut sessions = self.inner.lock().await;
        if sessions.by_guild.contains_key(&guild) {
            return Err(GameError::AlreadyRunning);
        }
        sessions.next_id += 1;
        let id = sessions.next_id;
        sessions.by_guild.insert(
            guild,
            Session {
                id,
                game,
                cancel: CancellationToken::new(),
            },
        );
        info!("guild {guild}: opened session {id}");
        Ok(id)
    }

    pub async fn contains(&self, guild: GuildKey) -> bool {
        self.inner.lock().await.by_guild.contains_key(&guild)
    }

    pub async fn with_game<R>(&self, guild: GuildKey, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        sessions.by_guild.get_mut(&guild).map(|s| f(&mut s.game))
    }

    pub async fn try_with_game<R>(
        &self,
        guild: GuildKey,
        f: impl FnOnce(&mut Game) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        self.with_game(guild, f)
            .await
            .unwrap_or(Err(GameError::NoActiveGame))
    }

    pub async fn try_with_current<R>(
        &self,
        guild: GuildKey,
        f: impl FnOnce(SessionId, &mut Game) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let mut sessions = self.inner.lock().await;
        match sessions.by_guild.get_mut(&guild) {
            Some(s) => f(s.id, &mut s.game),
            None => Err(GameError::NoActiveGame),
        }
    }

    pub async fn with_session<R>(
        &self,
        guild: GuildKey,
        session: SessionId,
        f: impl FnOnce(&mut Game) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        match sessions.by_guild.get_mut(&guild) {
            Some(s) if s.id == session => Some(f(&mut s.game)),
            _ => None,
        }
    }

    pub async fn cancellation(&self, guild: GuildKey, session: SessionId) -> Option<CancellationToken> {
        let sessions = self.inner.lock().await;
        match sessions.by_guild.get(&guild) {
            Some(s) if s.id == session => Some(s.cancel.clone()),
            _ => None,
        }
    }

    /// Removes the guild's game whatever session it is in, and wakes its
    /// round loop.
    pub async fn close(&self, guild: GuildKey) -> Option<Game> {
        self.inner.lock().await.take(guild)
    }

    pub async fn close_if(&self, guild: GuildKey, pred: impl FnOnce(&Game) -> bool) -> Option<Game> {
        let mut sessions = self.inner.lock().await;
        if !sessions.by_guild.get(&guild).is_some_and(|s| pred(&s.game)) {
            return None;
        }
        sessions.take(guild)
    }

    pub async fn close_session(&self, guild: GuildKey, session: SessionId) -> Option<Game> {
        let mut sessions = self.inner.lock().await;
        if sessions.by_guild.get(&guild).map(|s| s.id) != Some(session) {
            return None;
        }
        sessions.take(guild)
    }
}
