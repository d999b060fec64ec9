use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use tokio::{
    task::JoinSet,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::GameError,
    events::{DeathCause, EventEntry, GameEvent},
    player::PlayerId,
    sessions::{GuildKey, SessionId, SessionStore},
    table::Table,
};

pub async fn run_game<T: Table + 'static>(
    sessions: SessionStore,
    guild: GuildKey,
    session: SessionId,
    table: Arc<T>,
) {
    let Some(cancel) = sessions.cancellation(guild, session).await else {
        return;
    };
    let Some((players, jack)) = sessions
        .with_session(guild, session, |g| (g.player_ids(), g.jack()))
        .await
    else {
        return;
    };
    let Some(jack) = jack else {
        abort(&sessions, guild, session, GameError::NoJack).await;
        return;
    };

    for player in players {
        table
            .announce(&EventEntry::private(player, GameEvent::GameStarted))
            .await;
    }
    table
        .announce(&EventEntry::private(jack, GameEvent::JackAssigned))
        .await;

    loop {
        let Some((round, alive, discussion)) = sessions
            .with_session(guild, session, |g| {
                (g.round(), g.alive_ids(), g.config().discussion())
            })
            .await
        else {
            return;
        };
        info!("guild {guild}: round {round} discussion, {} alive", alive.len());
        table
            .announce(&EventEntry::public(GameEvent::RoundStarted {
                round,
                alive,
                discussion,
            }))
            .await;
        if !wait(&cancel, discussion).await {
            return;
        }

        let opened = sessions
            .with_session(guild, session, |g| {
                g.open_answers().map(|asked| (asked, g.config().answer()))
            })
            .await;
        let (asked, answer) = match opened {
            None => return,
            Some(Err(e)) => {
                abort(&sessions, guild, session, e).await;
                return;
            }
            Some(Ok(stage)) => stage,
        };
        info!("guild {guild}: round {round} answers, {} asked", asked.len());
        table
            .announce(&EventEntry::public(GameEvent::AnswerStageStarted {
                round,
                answer,
            }))
            .await;

        let deadline = Instant::now() + answer;
        if !collect_guesses(&sessions, guild, session, &table, &cancel, round, asked, deadline).await
        {
            return;
        }

        let Some(timed_out) = sessions
            .with_session(guild, session, |g| g.kill_players_with_no_guess())
            .await
        else {
            return;
        };
        for player in timed_out {
            debug!("guild {guild}: player {player} did not answer");
            table
                .announce(&EventEntry::private(player, GameEvent::TimedOut(player)))
                .await;
            table
                .announce(&EventEntry::public(GameEvent::PlayerDied(
                    player,
                    DeathCause::NoGuess,
                )))
                .await;
        }

        let next = sessions
            .with_session(guild, session, |g| {
                if g.should_continue() {
                    g.begin_round(&mut rand::thread_rng()).map(Some)
                } else {
                    Ok(None)
                }
            })
            .await;
        match next {
            None => return,
            Some(Err(e)) => {
                abort(&sessions, guild, session, e).await;
                return;
            }
            Some(Ok(Some(round))) => debug!("guild {guild}: advancing to round {round}"),
            Some(Ok(None)) => break,
        }
    }

    finish(&sessions, guild, session, table.as_ref()).await;
}

/// Sleeps unless the session is closed first. Returns whether the full
/// duration passed.
async fn wait(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = time::sleep(duration) => true,
    }
}

/// One task per asked player. Each applies its guess as soon as it arrives.
/// Returns once the deadline has passed and every task is done, or `false`
/// early when the session is closed.
#[allow(clippy::too_many_arguments)]
async fn collect_guesses<T: Table + 'static>(
    sessions: &SessionStore,
    guild: GuildKey,
    session: SessionId,
    table: &Arc<T>,
    cancel: &CancellationToken,
    round: u32,
    asked: Vec<PlayerId>,
    deadline: Instant,
) -> bool {
    let mut collectors = JoinSet::new();
    for player in asked {
        let sessions = sessions.clone();
        let table = Arc::clone(table);
        collectors.spawn(async move {
            let guess = time::timeout_at(deadline, table.collect_guess(player, round, deadline))
                .await
                .ok()
                .flatten();
            let Some(guess) = guess else {
                return;
            };
            let verdict = sessions
                .with_session(guild, session, |g| {
                    g.submit_guess(player, guess).map(|p| (p.is_alive(), p.suit()))
                })
                .await;
            match verdict {
                None => debug!("guild {guild}: guess of {player} arrived after the game ended"),
                Some(Err(e)) => warn!("guild {guild}: guess of {player} rejected: {e}"),
                Some(Ok((true, _))) => {
                    debug!("guild {guild}: {player} guessed right");
                    table
                        .announce(&EventEntry::private(
                            player,
                            GameEvent::GuessCorrect { player, round },
                        ))
                        .await;
                }
                Some(Ok((false, suit))) => {
                    debug!("guild {guild}: {player} guessed {guess}, was {suit}");
                    table
                        .announce(&EventEntry::private(
                            player,
                            GameEvent::GuessWrong {
                                player,
                                guess,
                                suit,
                            },
                        ))
                        .await;
                    table
                        .announce(&EventEntry::public(GameEvent::PlayerDied(
                            player,
                            DeathCause::WrongGuess,
                        )))
                        .await;
                }
            }
        });
    }

    let expired = tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = time::sleep_until(deadline) => true,
    };
    if !expired {
        collectors.abort_all();
        return false;
    }
    while let Some(joined) = collectors.join_next().await {
        if let Err(e) = joined {
            error!("guild {guild}: guess collector failed: {e}");
        }
    }
    !cancel.is_cancelled()
}

async fn finish<T: Table + ?Sized>(
    sessions: &SessionStore,
    guild: GuildKey,
    session: SessionId,
    table: &T,
) {
    let resolved = sessions
        .with_session(guild, session, |g| {
            let outcome = g
                .resolve()
                .and_then(|outcome| g.jack().map(|jack| (outcome, jack)).ok_or(GameError::NoJack));
            (outcome, g.alive_ids(), g.round())
        })
        .await;
    let Some((outcome, alive, round)) = resolved else {
        return;
    };
    match outcome {
        Ok((outcome, jack)) => {
            info!("guild {guild}: game over after round {round}: {outcome:?}");
            table
                .announce(&EventEntry::public(GameEvent::GameOver {
                    outcome,
                    jack,
                    alive,
                }))
                .await;
        }
        Err(e) => {
            error!("guild {guild}: {e}");
            table
                .announce(&EventEntry::public(GameEvent::Unresolved { alive }))
                .await;
        }
    }
    sessions.close_session(guild, session).await;
}

async fn abort(sessions: &SessionStore, guild: GuildKey, session: SessionId, e: GameError) {
    error!("guild {guild}: tearing down session {session}: {e}");
    sessions.close_session(guild, session).await;
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use rand::{rngs::StdRng, SeedableRng};
    use strum::IntoEnumIterator;
    use tokio::time::Instant;

    use crate::{
        config::GameConfig,
        events::{DeathCause, EventEntry, EventVisibility, GameEvent},
        game_state::{Game, Outcome},
        player::PlayerId,
        round_loop::run_game,
        sessions::{SessionId, SessionStore},
        suit::Suit,
        table::Table,
    };

    const GUILD: u64 = 77;

    #[derive(Clone, Copy, Debug)]
    enum Answer {
        Right,
        Wrong,
        Silent,
        /// Leaves the game, then answers right anyway.
        Forfeit,
    }

    struct ScriptedTable {
        sessions: SessionStore,
        /// Answers per round; the last one repeats. Unscripted players answer
        /// right.
        script: HashMap<PlayerId, Vec<Answer>>,
        log: Mutex<Vec<EventEntry>>,
    }

    impl ScriptedTable {
        fn new(sessions: &SessionStore, script: HashMap<PlayerId, Vec<Answer>>) -> Arc<Self> {
            Arc::new(ScriptedTable {
                sessions: sessions.clone(),
                script,
                log: Mutex::new(vec![]),
            })
        }

        fn events(&self) -> Vec<EventEntry> {
            self.log.lock().unwrap().clone()
        }

        fn rounds(&self) -> Vec<u32> {
            self.events()
                .into_iter()
                .filter_map(|e| match e.event {
                    GameEvent::RoundStarted { round, .. } => Some(round),
                    _ => None,
                })
                .collect()
        }

        fn game_over(&self) -> Option<GameEvent> {
            self.events()
                .into_iter()
                .map(|e| e.event)
                .find(|e| matches!(e, GameEvent::GameOver { .. }))
        }
    }

    #[async_trait]
    impl Table for ScriptedTable {
        async fn announce(&self, entry: &EventEntry) {
            self.log.lock().unwrap().push(entry.clone());
        }

        async fn collect_guess(
            &self,
            player: PlayerId,
            round: u32,
            _deadline: Instant,
        ) -> Option<Suit> {
            let answer = self
                .script
                .get(&player)
                .and_then(|s| s.get(round as usize - 1).or(s.last()))
                .copied()
                .unwrap_or(Answer::Right);
            let suit = self
                .sessions
                .with_game(GUILD, |g| g.player(player).map(|p| p.suit()))
                .await?
                .ok()?;
            match answer {
                Answer::Right => Some(suit),
                Answer::Wrong => Suit::iter().find(|&s| s != suit),
                Answer::Silent => std::future::pending().await,
                Answer::Forfeit => {
                    self.sessions
                        .with_game(GUILD, |g| g.forfeit(player).map(|_| ()))
                        .await?
                        .ok()?;
                    Some(suit)
                }
            }
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> GameConfig {
        GameConfig::from_minutes(2, 1, 3).unwrap()
    }

    /// Opens a started game with players `1..=count`. Returns the session and
    /// the jack.
    async fn started(store: &SessionStore, count: u64) -> (SessionId, PlayerId) {
        init_logs();
        let mut rng = StdRng::seed_from_u64(9);
        let mut game = Game::new(1, "p1".to_string(), config(), &mut rng);
        for id in 2..=count {
            game.add_player(id, format!("p{id}"), &mut rng).unwrap();
        }
        let jack = game.start(1, &mut rng).unwrap();
        (store.open(GUILD, game).await.unwrap(), jack)
    }

    #[tokio::test(start_paused = true)]
    async fn jack_dying_should_end_game_with_players_win() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 4).await;
        let table = ScriptedTable::new(
            &store,
            HashMap::from([(jack, vec![Answer::Right, Answer::Wrong])]),
        );

        let begin = Instant::now();
        run_game(store.clone(), GUILD, session, table.clone()).await;

        assert_eq!(table.rounds(), vec![1, 2]);
        let mut survivors = vec![1, 2, 3, 4];
        survivors.retain(|&p| p != jack);
        assert_eq!(
            table.game_over(),
            Some(GameEvent::GameOver {
                outcome: Outcome::PlayersWin,
                jack,
                alive: survivors,
            })
        );
        assert!(table.events().contains(&EventEntry::public(GameEvent::PlayerDied(
            jack,
            DeathCause::WrongGuess
        ))));
        assert!(!store.contains(GUILD).await);
        // stages are never cut short, even when everyone answered at once
        assert!(Instant::now() - begin >= Duration::from_secs(2 * 180));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_player_should_be_swept_and_jack_win() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 3).await;
        let silent = (1..=3).find(|&p| p != jack).unwrap();
        let table = ScriptedTable::new(&store, HashMap::from([(silent, vec![Answer::Silent])]));

        run_game(store.clone(), GUILD, session, table.clone()).await;

        let events = table.events();
        assert!(events.contains(&EventEntry::private(silent, GameEvent::TimedOut(silent))));
        assert!(events.contains(&EventEntry::public(GameEvent::PlayerDied(
            silent,
            DeathCause::NoGuess
        ))));
        assert_eq!(table.rounds(), vec![1]);
        assert!(matches!(
            table.game_over(),
            Some(GameEvent::GameOver {
                outcome: Outcome::JackWins,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn everyone_wrong_should_end_with_everyone_dead() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 3).await;
        let script = (1..=3).map(|p| (p, vec![Answer::Wrong])).collect();
        let table = ScriptedTable::new(&store, script);

        run_game(store.clone(), GUILD, session, table.clone()).await;

        assert_eq!(
            table.game_over(),
            Some(GameEvent::GameOver {
                outcome: Outcome::EveryoneDead,
                jack,
                alive: vec![],
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rounds_should_count_up_by_one_until_jack_dies() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 5).await;
        let script = HashMap::from([(
            jack,
            vec![Answer::Right, Answer::Right, Answer::Right, Answer::Wrong],
        )]);
        let table = ScriptedTable::new(&store, script);

        run_game(store.clone(), GUILD, session, table.clone()).await;

        assert_eq!(table.rounds(), vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_should_tell_every_player_and_only_the_jack_its_role() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 3).await;
        let table = ScriptedTable::new(&store, HashMap::from([(jack, vec![Answer::Wrong])]));

        run_game(store.clone(), GUILD, session, table.clone()).await;

        let events = table.events();
        for player in 1..=3 {
            assert!(events.contains(&EventEntry::private(player, GameEvent::GameStarted)));
        }
        let jack_notes = events
            .iter()
            .filter(|e| e.event == GameEvent::JackAssigned)
            .map(|e| e.visibility)
            .collect::<Vec<_>>();
        assert_eq!(jack_notes, vec![EventVisibility::Private(jack)]);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_session_should_stop_the_loop() {
        let store = SessionStore::new();
        let (session, _) = started(&store, 3).await;
        let table = ScriptedTable::new(&store, HashMap::new());

        let handle = tokio::spawn(run_game(store.clone(), GUILD, session, table.clone()));
        tokio::time::sleep(Duration::from_secs(30)).await;
        store.close(GUILD).await.unwrap();

        let begin = Instant::now();
        handle.await.unwrap();
        assert!(Instant::now() - begin < Duration::from_secs(1));
        assert_eq!(table.rounds(), vec![1]);
        assert_eq!(table.game_over(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_loop_should_not_touch_new_game_in_same_guild() {
        let store = SessionStore::new();
        let (old, _) = started(&store, 3).await;
        let table = ScriptedTable::new(&store, HashMap::new());
        let handle = tokio::spawn(run_game(store.clone(), GUILD, old, table.clone()));
        tokio::time::sleep(Duration::from_secs(150)).await;

        store.close(GUILD).await.unwrap();
        let fresh = Game::new(9, "p9".to_string(), config(), &mut StdRng::seed_from_u64(0));
        store.open(GUILD, fresh).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            store.with_game(GUILD, |g| (g.round(), g.host())).await,
            Some((0, 9))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn jack_and_one_other_dying_should_leave_outcome_unresolved() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 3).await;
        let others = (1..=3).filter(|&p| p != jack).collect::<Vec<_>>();
        let (loser, survivor) = (others[0], others[1]);
        let script = HashMap::from([(jack, vec![Answer::Wrong]), (loser, vec![Answer::Wrong])]);
        let table = ScriptedTable::new(&store, script);

        run_game(store.clone(), GUILD, session, table.clone()).await;

        assert!(table.events().contains(&EventEntry::public(GameEvent::Unresolved {
            alive: vec![survivor]
        })));
        assert_eq!(table.game_over(), None);
        assert!(!store.contains(GUILD).await);
    }

    #[tokio::test(start_paused = true)]
    async fn forfeited_player_should_not_survive_with_a_late_guess() {
        let store = SessionStore::new();
        let (session, jack) = started(&store, 4).await;
        let quitter = (1..=4).find(|&p| p != jack).unwrap();
        let script = HashMap::from([
            (quitter, vec![Answer::Forfeit]),
            (jack, vec![Answer::Right, Answer::Wrong]),
        ]);
        let table = ScriptedTable::new(&store, script);

        run_game(store.clone(), GUILD, session, table.clone()).await;

        let events = table.events();
        assert!(!events.iter().any(|e| matches!(
            e.event,
            GameEvent::GuessCorrect { player, .. } if player == quitter
        )));
        assert!(!events.contains(&EventEntry::private(quitter, GameEvent::TimedOut(quitter))));
        let second_round = events.iter().find_map(|e| match &e.event {
            GameEvent::RoundStarted { round: 2, alive, .. } => Some(alive.clone()),
            _ => None,
        });
        assert_eq!(second_round.map(|alive| alive.contains(&quitter)), Some(false));
        let mut survivors = vec![1, 2, 3, 4];
        survivors.retain(|&p| p != jack && p != quitter);
        assert_eq!(
            table.game_over(),
            Some(GameEvent::GameOver {
                outcome: Outcome::PlayersWin,
                jack,
                alive: survivors,
            })
        );
    }
}
