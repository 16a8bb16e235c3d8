#![forbid(unsafe_code)]

mod catches;
mod contests;
pub mod models;

use std::str::FromStr;

use log::debug;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub use catches::{biggest_catch, fish_leaderboard, record_catch, user_stats};
pub use contests::{
    add_participant, contest_by_id, contest_leaderboard, create_contest, finish_contest,
    next_contest_id, past_contests, set_contest_thread,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not parse database url")]
    ParseUrl(#[source] sqlx::Error),

    #[error("Could not connect to database")]
    Connect(#[source] sqlx::Error),

    #[error("Could not migrate database")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Could not insert catch")]
    InsertCatch(#[source] sqlx::Error),

    #[error("Could not query catches")]
    QueryCatches(#[source] sqlx::Error),

    #[error("Could not insert contest")]
    InsertContest(#[source] sqlx::Error),

    #[error("Could not update contest")]
    UpdateContest(#[source] sqlx::Error),

    #[error("Could not query contests")]
    QueryContests(#[source] sqlx::Error),

    #[error("Could not add contest participant")]
    AddParticipant(#[source] sqlx::Error),
}

/// Opens a pool on `url`, creating the database file if needed.
pub async fn connect(url: &str) -> Result<SqlitePool, Error> {
    debug!("Opening database connection to {url}");

    let options = SqliteConnectOptions::from_str(url)
        .map_err(Error::ParseUrl)?
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(Error::Connect)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}
