use std::sync::Arc;

use jack_core::{
    config::minutes, run_game, Game, GameConfig, GameError, GuildKey, PlayerId, SessionStore,
    Stage, Suit,
};
use log::{debug, error, info, warn};
use poise::serenity_prelude as serenity;

use crate::{
    discord_table::DiscordTable,
    render::{self, GuildHeader, Names},
};

/// Shared by every command invocation.
pub struct Data {
    pub sessions: SessionStore,
    pub game: GameConfig,
    pub prefix: String,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        new_game(),
        start_game(),
        stop_game(),
        join_game(),
        leave_game(),
        show_suits(),
        help(),
    ]
}

fn guild_key(ctx: Context<'_>) -> Result<GuildKey, Error> {
    ctx.guild_id()
        .map(|guild| guild.get())
        .ok_or_else(|| "This command can only be used in a server!".into())
}

fn author(ctx: Context<'_>) -> (PlayerId, String) {
    (ctx.author().id.get(), ctx.author().name.clone())
}

fn guild_header(ctx: Context<'_>, guild: GuildKey) -> GuildHeader {
    let name = serenity::GuildId::new(guild)
        .name(ctx.serenity_context())
        .unwrap_or_else(|| "unknown server".to_string());
    GuildHeader { name, id: guild }
}

/// Starts a new game.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "new",
    aliases("newgame", "ng")
)]
pub async fn new_game(
    ctx: Context<'_>,
    #[description = "Length of the discussion stage in minutes"] discussion_minutes: Option<u64>,
    #[description = "Length of the answer stage in minutes"] answer_minutes: Option<u64>,
) -> Result<(), Error> {
    let guild = guild_key(ctx)?;
    let (id, name) = author(ctx);
    let defaults = ctx.data().game;
    let config = GameConfig::new(
        discussion_minutes.map_or(defaults.discussion(), minutes),
        answer_minutes.map_or(defaults.answer(), minutes),
        defaults.min_players(),
    )?;

    let game = Game::new(id, name.clone(), config, &mut rand::thread_rng());
    let roster = game.roster();
    ctx.data().sessions.open(guild, game).await?;
    info!("guild {guild}: {name} opened a game");
    ctx.say(render::lobby_opened(&name, &config, 1, &roster))
        .await?;
    Ok(())
}

/// Stops the current game. Can only be run by person who started the game.
#[poise::command(prefix_command, slash_command, guild_only, rename = "stop")]
pub async fn stop_game(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(ctx)?;
    let (id, name) = author(ctx);
    let sessions = &ctx.data().sessions;

    sessions.try_with_game(guild, |g| g.ensure_host(id)).await?;
    if sessions.close_if(guild, |g| g.host() == id).await.is_none() {
        return Err(GameError::NoActiveGame.into());
    }
    info!("guild {guild}: {name} stopped the game");
    ctx.say(format!("{name} stopped the existing game.")).await?;
    Ok(())
}

/// Join the current game. Can only be run if there is an active game.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "join",
    aliases("j")
)]
pub async fn join_game(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(ctx)?;
    let (id, name) = author(ctx);

    let (count, roster) = ctx
        .data()
        .sessions
        .try_with_game(guild, |g| {
            g.add_player(id, name.clone(), &mut rand::thread_rng())?;
            Ok((g.players().len(), g.roster()))
        })
        .await?;
    ctx.say(render::joined(&name, count, &roster)).await?;
    Ok(())
}

enum Departure {
    Left {
        count: usize,
        roster: String,
        new_host: Option<String>,
    },
    Emptied,
    Forfeited,
}

/// Leave the current game. Once the game runs, leaving means dying.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "leave",
    aliases("l")
)]
pub async fn leave_game(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(ctx)?;
    let (id, name) = author(ctx);
    let sessions = &ctx.data().sessions;

    let departure = sessions
        .try_with_game(guild, |g| {
            if g.stage() != Stage::NotStarted {
                g.forfeit(id)?;
                return Ok(Departure::Forfeited);
            }
            let was_host = g.host() == id;
            g.remove_player(id)?;
            if g.is_empty() {
                return Ok(Departure::Emptied);
            }
            Ok(Departure::Left {
                count: g.players().len(),
                roster: g.roster(),
                new_host: was_host.then(|| g.host_name().to_string()),
            })
        })
        .await?;

    match departure {
        Departure::Left {
            count,
            roster,
            new_host,
        } => {
            if let Some(next) = new_host {
                ctx.say(render::host_changed(&name, &next)).await?;
            }
            ctx.say(render::left(&name, count, &roster)).await?;
        }
        Departure::Emptied => {
            sessions.close_if(guild, |g| g.is_empty()).await;
            ctx.say("All players have left the game, quitting the game.")
                .await?;
        }
        Departure::Forfeited => {
            info!("guild {guild}: {name} forfeited");
            ctx.say(format!("**{name} died!**")).await?;
        }
    }
    Ok(())
}

/// Starts the current game. Can only be run by the host.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "start",
    aliases("startgame", "sg")
)]
pub async fn start_game(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(ctx)?;
    let (id, name) = author(ctx);
    let sessions = &ctx.data().sessions;

    let (session, names, answer) = sessions
        .try_with_current(guild, |session, g| {
            let jack = g.start(id, &mut rand::thread_rng())?;
            debug!("guild {guild}: jack is {jack}");
            let names = g
                .players()
                .iter()
                .map(|p| (p.id(), p.name().to_string()))
                .collect::<Names>();
            Ok((session, names, g.config().answer()))
        })
        .await?;

    let header = guild_header(ctx, guild);
    info!("guild {guild}: {name} started session {session}");
    ctx.say(render::game_started(&name, &header, &ctx.data().prefix))
        .await?;

    let table = DiscordTable::new(
        ctx.serenity_context().clone(),
        ctx.channel_id(),
        header,
        names,
        answer,
    );
    tokio::spawn(run_game(sessions.clone(), guild, session, Arc::new(table)));
    Ok(())
}

/// Shows the suits of the other players in a game. DM only.
#[poise::command(prefix_command, rename = "show")]
pub async fn show_suits(
    ctx: Context<'_>,
    #[description = "Id of the server the game runs in"] guild_id: Option<u64>,
) -> Result<(), Error> {
    let prefix = &ctx.data().prefix;
    if let Some(here) = ctx.guild_id() {
        ctx.say(render::show_in_dm_only(prefix, here.get())).await?;
        return Ok(());
    }
    let Some(guild) = guild_id else {
        ctx.say(render::show_usage(prefix)).await?;
        return Ok(());
    };
    let (id, _) = author(ctx);

    let (round, others) = ctx
        .data()
        .sessions
        .try_with_game(guild, |g| {
            let others = g
                .suits_visible_to(id)?
                .into_iter()
                .map(|p| (p.name().to_string(), p.suit()))
                .collect::<Vec<(String, Suit)>>();
            Ok((g.round(), others))
        })
        .await?;
    ctx.say(render::suits(&guild_header(ctx, guild), round, &others))
        .await?;
    Ok(())
}

/// Shows this help menu.
#[poise::command(prefix_command, slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to get help for"] command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Find the Jack of Hearts before only two of you are left.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Rejected commands are answered with the reason; anything else is logged.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if let Some(e) = error.downcast_ref::<GameError>() {
                debug!("{} rejected: {e}", ctx.command().name);
                e.to_string()
            } else if let Some(e) = error.downcast_ref::<jack_core::ConfigError>() {
                format!("Invalid game settings: {e}.")
            } else {
                error!("{} failed: {error}", ctx.command().name);
                "**ERROR:** Unspecified error occurred, please check bot logs.".to_string()
            };
            if let Err(e) = ctx.say(reply).await {
                warn!("could not report error: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("error while handling error: {e}");
            }
        }
    }
}
