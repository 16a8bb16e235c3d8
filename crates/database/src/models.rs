use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const FISH: &str = "fish";
pub const MEMBER: &str = "member";

/// A catch about to be stored.
#[derive(Debug, Clone)]
pub struct NewCatch {
    pub user_id: String,
    pub user_name: String,
    /// [`FISH`] or [`MEMBER`].
    pub catch_type: &'static str,
    pub catch_name: String,
    pub rarity: Option<String>,
    pub size: Option<f64>,
    pub weight: f64,
    pub points: u32,
    pub timestamp: DateTime<Utc>,
    pub contest_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Catch {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub catch_type: String,
    pub catch_name: String,
    pub rarity: Option<String>,
    pub size: Option<f64>,
    pub weight: f64,
    pub points: i64,
    pub timestamp: DateTime<Utc>,
    pub contest_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub user_name: String,
    pub total_points: i64,
    pub catches: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserStats {
    pub catches: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone)]
pub struct NewContest {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub channel_id: Option<String>,
    pub created_by: String,
}

/// Final numbers written when a contest ends or is cancelled.
#[derive(Debug, Clone)]
pub struct ContestSummary {
    pub winner_id: Option<String>,
    pub winner_name: Option<String>,
    pub total_participants: i64,
    pub total_catches: i64,
    pub cancelled: bool,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub channel_id: Option<String>,
    pub thread_id: Option<String>,
    pub created_by: String,
    pub winner_id: Option<String>,
    pub winner_name: Option<String>,
    pub total_participants: i64,
    pub total_catches: i64,
    pub cancelled: bool,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ContestStanding {
    pub user_id: String,
    pub user_name: String,
    pub total_points: i64,
    pub catches: i64,
    pub best_catch: i64,
}
