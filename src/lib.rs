#![forbid(unsafe_code)]

pub mod announcer;
pub mod assets;
pub mod command;
pub mod config;
pub mod handler;
pub mod render;
pub mod runner;

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use fishing_engine::{ConfigError, ContestError, ContestId, Engine, FishingConfig, UserId};
use log::info;
use serenity::model::id::ChannelId;
use sqlx::SqlitePool;

use crate::config::Config;

/// Where a contest is announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub channel: ChannelId,
    pub thread: Option<ChannelId>,
}

/// State shared between the event handler and the contest announcer.
#[derive(Debug)]
pub struct Bot {
    pub config: Config,
    pub engine: Engine,
    pub db: SqlitePool,
    game: Mutex<FishingConfig>,
    rooms: Mutex<HashMap<ContestId, Room>>,
    names: Mutex<HashMap<UserId, String>>,
}

impl Bot {
    pub fn new(
        config: Config,
        game: FishingConfig,
        db: SqlitePool,
        first_contest_id: ContestId,
    ) -> Result<Self, ConfigError> {
        let settings = game.validate()?;
        info!("Loaded {} fish", settings.catalog.len());

        Ok(Self {
            config,
            engine: Engine::with_first_contest_id(settings, first_contest_id),
            db,
            game: Mutex::new(game),
            rooms: Mutex::default(),
            names: Mutex::default(),
        })
    }

    /// A copy of the editable fishing config.
    pub fn game_config(&self) -> FishingConfig {
        lock(&self.game).clone()
    }

    /// Applies `edit` to the fishing config, then validates, saves and
    /// activates the result. Nothing changes if any step fails.
    pub fn update_game_config<F>(&self, edit: F) -> Result<(), config::Error>
    where
        F: FnOnce(&mut FishingConfig),
    {
        let path = &self.config.fishing_config;
        let mut game = lock(&self.game);

        let mut edited = game.clone();
        edit(&mut edited);

        let settings = edited.validate().map_err(|source| config::Error::Invalid {
            source,
            path: path.clone(),
        })?;
        config::save_game_config(path, &edited)?;
        self.engine.reload(settings);
        *game = edited;

        Ok(())
    }

    /// Re-reads the fishing config from disk and returns the new fish count.
    pub fn reload_game_config(&self) -> Result<usize, config::Error> {
        let path = &self.config.fishing_config;
        let mut game = lock(&self.game);

        let loaded = config::load_game_config(path)?;
        let settings = loaded.validate().map_err(|source| config::Error::Invalid {
            source,
            path: path.clone(),
        })?;
        let count = settings.catalog.len();
        self.engine.reload(settings);
        *game = loaded;

        Ok(count)
    }

    /// Schedules a contest and opens its room in one step, so the announcer
    /// never sees a transition for a contest without a room.
    pub fn schedule_contest<F>(
        &self,
        start_time: DateTime<Utc>,
        duration: Duration,
        now: DateTime<Utc>,
        room: F,
    ) -> Result<(ContestId, Room), ContestError>
    where
        F: FnOnce(ContestId) -> Room,
    {
        let mut rooms = lock(&self.rooms);
        let id = self.engine.schedule_contest(start_time, duration, now)?;
        let room = room(id);
        rooms.insert(id, room.clone());

        Ok((id, room))
    }

    pub fn room(&self, contest: ContestId) -> Option<Room> {
        lock(&self.rooms).get(&contest).cloned()
    }

    pub fn set_thread(&self, contest: ContestId, thread: ChannelId) {
        if let Some(room) = lock(&self.rooms).get_mut(&contest) {
            room.thread = Some(thread);
        }
    }

    pub fn close_room(&self, contest: ContestId) -> Option<Room> {
        lock(&self.rooms).remove(&contest)
    }

    pub fn remember_name(&self, user: UserId, name: &str) {
        lock(&self.names).insert(user, name.to_string());
    }

    /// The last known display name of `user`, or a mention.
    pub fn name_of(&self, user: UserId) -> String {
        lock(&self.names)
            .get(&user)
            .cloned()
            .unwrap_or_else(|| format!("<@{user}>"))
    }
}

/// Contest ids as stored in the database.
///
/// Ids are handed out sequentially from the database's own maximum.
pub fn db_id(contest: ContestId) -> i64 {
    i64::try_from(contest).unwrap_or(i64::MAX)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = r#"{
        "cooldown_seconds": 30,
        "fish": [
            { "name": "Bass", "min_size_cm": 20, "max_size_cm": 60, "min_weight_kg": 0.5, "max_weight_kg": 4 }
        ]
    }"#;

    /// A bot whose config lives in a directory removed on drop.
    fn bot() -> (TempDir, Bot) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let fishing_config = dir.join("config.json");
        std::fs::write(&fishing_config, CONFIG).unwrap();

        let config = Config {
            token: SecretString::new("token".to_string()),
            database_url: "sqlite::memory:".to_string(),
            fishing_config: fishing_config.clone(),
            bundled_config: dir.join("bundled.json"),
            assets_dir: dir.join("assets"),
            prefix: "!".to_string(),
        };
        let game = config::load_game_config(&fishing_config).unwrap();
        let db = SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .unwrap();

        (tmp, Bot::new(config, game, db, 1).unwrap())
    }

    #[tokio::test]
    async fn config_edits_are_saved_and_applied() {
        let (_dir, bot) = bot();

        bot.update_game_config(|game| game.cooldown_seconds = 90)
            .unwrap();

        assert_eq!(bot.engine.settings().cooldown, Duration::seconds(90));
        let saved = config::load_game_config(&bot.config.fishing_config).unwrap();
        assert_eq!(saved.cooldown_seconds, 90);
    }

    #[tokio::test]
    async fn invalid_edits_change_nothing() {
        let (_dir, bot) = bot();

        let result = bot.update_game_config(|game| game.fish.clear());

        assert!(matches!(result, Err(config::Error::Invalid { .. })));
        assert_eq!(bot.game_config().fish.len(), 1);
        assert_eq!(bot.engine.settings().catalog.len(), 1);
    }

    #[tokio::test]
    async fn reload_picks_up_file_changes() {
        let (_dir, bot) = bot();
        let mut game = bot.game_config();
        game.fish.push(fishing_engine::FishConfig {
            name: "Pike".to_string(),
            rarity: "rare".to_string(),
            min_size_cm: 40.0,
            max_size_cm: 120.0,
            min_weight_kg: 1.0,
            max_weight_kg: 12.0,
            description: String::new(),
        });
        config::save_game_config(&bot.config.fishing_config, &game).unwrap();

        assert_eq!(bot.reload_game_config().unwrap(), 2);
        assert!(bot.engine.settings().catalog.find("pike").is_some());

        std::fs::write(&bot.config.fishing_config, "broken").unwrap();
        assert!(bot.reload_game_config().is_err());
        assert_eq!(bot.engine.settings().catalog.len(), 2);
    }

    #[tokio::test]
    async fn scheduling_opens_a_room() {
        let (_dir, bot) = bot();
        let now = Utc::now();
        let channel = ChannelId::new(42);

        let (id, _) = bot
            .schedule_contest(now + Duration::minutes(5), Duration::minutes(10), now, |id| {
                Room {
                    name: format!("Contest #{id}"),
                    channel,
                    thread: None,
                }
            })
            .unwrap();

        bot.set_thread(id, ChannelId::new(7));
        assert_eq!(bot.room(id).unwrap().thread, Some(ChannelId::new(7)));

        let again = bot.schedule_contest(now, Duration::minutes(1), now, |_| unreachable!());
        assert!(again.is_err());

        assert!(bot.close_room(id).is_some());
        assert!(bot.room(id).is_none());
    }

    #[tokio::test]
    async fn names_fall_back_to_mentions() {
        let (_dir, bot) = bot();

        bot.remember_name(5, "Angler");

        assert_eq!(bot.name_of(5), "Angler");
        assert_eq!(bot.name_of(6), "<@6>");
    }
}
