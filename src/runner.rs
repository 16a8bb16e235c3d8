use std::sync::Arc;

use futures_lite::stream::StreamExt;
use log::{debug, info};
use secrecy::ExposeSecret;
use serenity::{prelude::GatewayIntents, Client};
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::{sync::Notify, task::JoinHandle};

use crate::{
    announcer,
    config::{self, Config},
    handler::Handler,
    Bot,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not register signals")]
    RegisterSignals(#[source] std::io::Error),

    #[error("Could not load fishing config")]
    Config(#[from] config::Error),

    #[error("Fishing config is invalid")]
    InvalidConfig(#[from] fishing_engine::ConfigError),

    #[error("Could not prepare database")]
    Database(#[from] database::Error),

    #[error("Could not create discord client")]
    CreateClient(#[source] serenity::Error),

    #[error("Failed to run discord client")]
    Client(#[source] serenity::Error),

    #[error("Failed to run announcer task")]
    AnnouncerTask(#[source] tokio::task::JoinError),

    #[error("Failed to run signals task")]
    SignalsTask(#[source] tokio::task::JoinError),
}

pub async fn start_bot(config: Config) -> Result<(), Error> {
    let (quit, quit_handle, quit_task) = register_signals()?;

    info!("Connecting to database");
    let db = database::connect(&config.database_url).await?;
    info!("Running migrations");
    database::migrate(&db).await?;

    config::ensure_game_config(&config.fishing_config, &config.bundled_config)?;
    let game = config::load_game_config(&config.fishing_config)?;

    let first_contest_id = database::next_contest_id(&db).await?;
    let bot = Arc::new(Bot::new(
        config,
        game,
        db,
        u64::try_from(first_contest_id).unwrap_or(1),
    )?);

    info!("Creating discord client");
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(bot.config.token.expose_secret(), intents)
        .event_handler(Handler::new(bot.clone()))
        .await
        .map_err(Error::CreateClient)?;

    let announcer_task = tokio::spawn(announcer::run(
        bot.clone(),
        client.http.clone(),
        quit.clone(),
    ));

    let shutdown_task = tokio::spawn({
        let shard_manager = client.shard_manager.clone();
        let quit = quit.clone();

        async move {
            quit.notified().await;
            debug!("Shutting down shards");
            shard_manager.shutdown_all().await;
        }
    });

    let result = client.start().await.map_err(Error::Client);

    // stop the announcer even if the client stopped on its own
    quit.notify_waiters();
    shutdown_task.abort();
    announcer_task.await.map_err(Error::AnnouncerTask)?;

    // Terminate the signal stream.
    quit_handle.close();
    quit_task.await.map_err(Error::SignalsTask)?;

    bot.db.close().await;
    info!("Bye");

    result
}

fn register_signals() -> Result<(Arc<Notify>, signal_hook_tokio::Handle, JoinHandle<()>), Error> {
    info!("Registering signals");

    let signals = Signals::new([SIGINT, SIGTERM, SIGQUIT]).map_err(Error::RegisterSignals)?;
    let notify = Arc::new(Notify::new());

    let handle = signals.handle();
    let task = tokio::spawn(handle_signals(signals, notify.clone()));

    Ok((notify, handle, task))
}

async fn handle_signals(mut signals: Signals, quit_signal: Arc<Notify>) {
    info!("Starting signal handler");
    while let Some(signal) = signals.next().await {
        match signal {
            SIGTERM | SIGINT | SIGQUIT => {
                info!("Received signal {signal}, shutting down");
                quit_signal.notify_waiters();
                break;
            }
            _ => unreachable!(),
        }
    }
}
