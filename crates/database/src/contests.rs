use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::SqlitePool;

use crate::{
    models::{Contest, ContestStanding, ContestSummary, NewContest},
    Error,
};

pub async fn create_contest(pool: &SqlitePool, contest: &NewContest) -> Result<(), Error> {
    debug!("Storing contest #{}", contest.id);

    sqlx::query(
        r#"
        INSERT INTO contests (id, name, start_time, end_time, channel_id, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(contest.id)
    .bind(&contest.name)
    .bind(contest.start_time)
    .bind(contest.end_time)
    .bind(&contest.channel_id)
    .bind(&contest.created_by)
    .execute(pool)
    .await
    .map_err(Error::InsertContest)?;

    Ok(())
}

pub async fn set_contest_thread(pool: &SqlitePool, id: i64, thread_id: &str) -> Result<(), Error> {
    sqlx::query("UPDATE contests SET thread_id = ? WHERE id = ?")
        .bind(thread_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(Error::UpdateContest)?;

    Ok(())
}

/// Registers a participant, ignoring repeated joins.
pub async fn add_participant(
    pool: &SqlitePool,
    contest_id: i64,
    user_id: &str,
    user_name: &str,
    joined_at: DateTime<Utc>,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO contest_participants (contest_id, user_id, user_name, joined_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(contest_id)
    .bind(user_id)
    .bind(user_name)
    .bind(joined_at)
    .execute(pool)
    .await
    .map_err(Error::AddParticipant)?;

    Ok(())
}

pub async fn finish_contest(
    pool: &SqlitePool,
    id: i64,
    summary: &ContestSummary,
) -> Result<(), Error> {
    info!(
        "Closing contest #{id} with winner {}",
        summary.winner_name.as_deref().unwrap_or("nobody")
    );

    sqlx::query(
        r#"
        UPDATE contests
        SET winner_id = ?, winner_name = ?, total_participants = ?, total_catches = ?,
            cancelled = ?, ended_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&summary.winner_id)
    .bind(&summary.winner_name)
    .bind(summary.total_participants)
    .bind(summary.total_catches)
    .bind(summary.cancelled)
    .bind(summary.ended_at)
    .bind(id)
    .execute(pool)
    .await
    .map_err(Error::UpdateContest)?;

    Ok(())
}

/// Points per user within a contest.
///
/// Equal totals go to whoever made their last catch first.
pub async fn contest_leaderboard(
    pool: &SqlitePool,
    contest_id: i64,
    limit: u32,
) -> Result<Vec<ContestStanding>, Error> {
    sqlx::query_as(
        r#"
        SELECT user_id, MAX(user_name) AS user_name, SUM(points) AS total_points,
               COUNT(*) AS catches, MAX(points) AS best_catch
        FROM catches
        WHERE contest_id = ?
        GROUP BY user_id
        ORDER BY total_points DESC, MAX(timestamp) ASC
        LIMIT ?
        "#,
    )
    .bind(contest_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Error::QueryCatches)
}

pub async fn contest_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Contest>, Error> {
    sqlx::query_as("SELECT * FROM contests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::QueryContests)
}

/// Finished contests, newest first.
pub async fn past_contests(pool: &SqlitePool, limit: u32) -> Result<Vec<Contest>, Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM contests
        WHERE ended_at IS NOT NULL
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Error::QueryContests)
}

/// The id after the highest stored contest.
pub async fn next_contest_id(pool: &SqlitePool) -> Result<i64, Error> {
    let (next,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(id), 0) + 1 FROM contests")
        .fetch_one(pool)
        .await
        .map_err(Error::QueryContests)?;

    Ok(next)
}
