use log::debug;
use sqlx::SqlitePool;

use crate::{
    models::{Catch, LeaderboardEntry, NewCatch, UserStats, FISH},
    Error,
};

pub async fn record_catch(pool: &SqlitePool, catch: &NewCatch) -> Result<i64, Error> {
    debug!(
        "Recording {} catch {} for {}",
        catch.catch_type, catch.catch_name, catch.user_name
    );

    let result = sqlx::query(
        r#"
        INSERT INTO catches
            (user_id, user_name, catch_type, catch_name, rarity, size, weight, points, timestamp, contest_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&catch.user_id)
    .bind(&catch.user_name)
    .bind(catch.catch_type)
    .bind(&catch.catch_name)
    .bind(&catch.rarity)
    .bind(catch.size)
    .bind(catch.weight)
    .bind(i64::from(catch.points))
    .bind(catch.timestamp)
    .bind(catch.contest_id)
    .execute(pool)
    .await
    .map_err(Error::InsertCatch)?;

    Ok(result.last_insert_rowid())
}

/// Top fishers by points from fish catches.
pub async fn fish_leaderboard(pool: &SqlitePool, limit: u32) -> Result<Vec<LeaderboardEntry>, Error> {
    sqlx::query_as(
        r#"
        SELECT user_id, MAX(user_name) AS user_name, SUM(points) AS total_points, COUNT(*) AS catches
        FROM catches
        WHERE catch_type = ?
        GROUP BY user_id
        ORDER BY total_points DESC, MIN(timestamp) ASC
        LIMIT ?
        "#,
    )
    .bind(FISH)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Error::QueryCatches)
}

pub async fn user_stats(pool: &SqlitePool, user_id: &str) -> Result<UserStats, Error> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*) AS catches, COALESCE(SUM(points), 0) AS total_points
        FROM catches
        WHERE user_id = ? AND catch_type = ?
        "#,
    )
    .bind(user_id)
    .bind(FISH)
    .fetch_one(pool)
    .await
    .map_err(Error::QueryCatches)
}

/// The heaviest fish a user has caught.
pub async fn biggest_catch(pool: &SqlitePool, user_id: &str) -> Result<Option<Catch>, Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM catches
        WHERE user_id = ? AND catch_type = ?
        ORDER BY weight DESC, id ASC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(FISH)
    .fetch_optional(pool)
    .await
    .map_err(Error::QueryCatches)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::{memory, models::MEMBER};

    pub(crate) fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    pub(crate) fn fish(user: &str, name: &str, weight: f64, points: u32, secs: i64) -> NewCatch {
        NewCatch {
            user_id: user.to_string(),
            user_name: format!("user {user}"),
            catch_type: FISH,
            catch_name: name.to_string(),
            rarity: Some("common".to_string()),
            size: Some(30.0),
            weight,
            points,
            timestamp: at(secs),
            contest_id: None,
        }
    }

    #[tokio::test]
    async fn stores_and_reads_back_a_catch() {
        let pool = memory().await;

        let id = record_catch(&pool, &fish("1", "Bass", 2.5, 55, 0)).await.unwrap();
        let catch = biggest_catch(&pool, "1").await.unwrap().unwrap();

        assert_eq!(catch.id, id);
        assert_eq!(catch.catch_name, "Bass");
        assert_eq!(catch.points, 55);
        assert_eq!(catch.timestamp, at(0));
        assert_eq!(catch.contest_id, None);
    }

    #[tokio::test]
    async fn leaderboard_ignores_member_catches() {
        let pool = memory().await;
        record_catch(&pool, &fish("1", "Bass", 2.5, 55, 0)).await.unwrap();
        record_catch(&pool, &fish("1", "Pike", 4.0, 90, 1)).await.unwrap();
        record_catch(&pool, &fish("2", "Trout", 1.0, 40, 2)).await.unwrap();
        record_catch(
            &pool,
            &NewCatch {
                catch_type: MEMBER,
                catch_name: "someone".to_string(),
                points: 1_200,
                ..fish("2", "", 90.0, 0, 3)
            },
        )
        .await
        .unwrap();

        let board = fish_leaderboard(&pool, 10).await.unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "1");
        assert_eq!(board[0].total_points, 145);
        assert_eq!(board[0].catches, 2);
        assert_eq!(board[1].total_points, 40);

        let biggest = biggest_catch(&pool, "2").await.unwrap().unwrap();
        assert_eq!(biggest.catch_name, "Trout");
    }

    #[tokio::test]
    async fn stats_for_unknown_user_are_empty() {
        let pool = memory().await;

        assert_eq!(user_stats(&pool, "42").await.unwrap(), UserStats::default());
        assert!(biggest_catch(&pool, "42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stats_sum_fish_points() {
        let pool = memory().await;
        record_catch(&pool, &fish("1", "Bass", 2.5, 55, 0)).await.unwrap();
        record_catch(&pool, &fish("1", "Pike", 4.0, 90, 1)).await.unwrap();

        assert_eq!(
            user_stats(&pool, "1").await.unwrap(),
            UserStats {
                catches: 2,
                total_points: 145
            }
        );
    }
}
