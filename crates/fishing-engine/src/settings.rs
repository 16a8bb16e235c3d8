use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, Item, Span},
    rarity::{parse_color, Rarity, RarityTable},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not parse fishing config")]
    Parse(#[from] serde_json::Error),

    #[error("The catalog does not contain any fish")]
    EmptyCatalog,

    #[error("No rarity tiers configured")]
    NoRarities,

    #[error("Rarity `{0}` is configured more than once")]
    DuplicateRarity(String),

    #[error("Rarity `{rarity}` has invalid weight {weight}")]
    InvalidRarityWeight { rarity: String, weight: f64 },

    #[error("Rarity `{rarer}` must not weigh more than the more common `{common}`")]
    RarityOrder { rarer: String, common: String },

    #[error("Rarity `{rarity}` has invalid color `{color}`")]
    InvalidColor { rarity: String, color: String },

    #[error("Fish `{0}` is configured more than once")]
    DuplicateItem(String),

    #[error("Fish `{item}` references unknown rarity `{rarity}`")]
    UnknownRarity { item: String, rarity: String },

    #[error("Fish `{item}` has an invalid {axis} range {min}..={max}")]
    InvalidRange {
        item: String,
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{name} must be within 0 and 1, got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("{name} must be at most {max} seconds, got {value}")]
    DurationTooLong {
        name: &'static str,
        value: u64,
        max: u64,
    },
}

/// Score multiplier for catches made during an active contest.
pub const CONTEST_BONUS: f64 = 1.5;

const DEFAULT_COOLDOWN_SECONDS: u64 = 30;
const DEFAULT_NO_CATCH_CHANCE: f64 = 0.15;
const DEFAULT_MEMBER_CATCH_RATIO: u32 = 50;
const DEFAULT_CONTEST_COUNTDOWN_SECONDS: u64 = 60;

/// Upper bound for the cooldown and the contest countdown.
pub const MAX_CONFIG_SECONDS: u64 = 7 * 24 * 60 * 60;

/// The fishing configuration document as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingConfig {
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    #[serde(default = "default_no_catch_chance")]
    pub no_catch_chance: f64,
    /// One member catch in this many attempts, `0` disables them.
    #[serde(default = "default_member_catch_ratio")]
    pub member_catch_ratio: u32,
    #[serde(default = "default_contest_countdown_seconds")]
    pub contest_countdown_seconds: u64,
    #[serde(default = "default_rarities")]
    pub rarities: Vec<RarityConfig>,
    #[serde(default)]
    pub fish: Vec<FishConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityConfig {
    pub name: String,
    pub weight: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishConfig {
    pub name: String,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    pub min_size_cm: f64,
    pub max_size_cm: f64,
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    #[serde(default)]
    pub description: String,
}

fn default_cooldown_seconds() -> u64 {
    DEFAULT_COOLDOWN_SECONDS
}

fn default_no_catch_chance() -> f64 {
    DEFAULT_NO_CATCH_CHANCE
}

fn default_member_catch_ratio() -> u32 {
    DEFAULT_MEMBER_CATCH_RATIO
}

fn default_contest_countdown_seconds() -> u64 {
    DEFAULT_CONTEST_COUNTDOWN_SECONDS
}

fn default_rarity() -> String {
    "common".to_string()
}

fn default_rarities() -> Vec<RarityConfig> {
    [
        ("mythic", 0.25, "#ff00ff"),
        ("ultra-legendary", 0.75, "#ff4500"),
        ("legendary", 2.0, "#ffa500"),
        ("epic", 4.0, "#9932cc"),
        ("rare", 8.0, "#1e90ff"),
        ("uncommon", 15.0, "#2ecc71"),
        ("common", 30.0, "#95a5a6"),
        ("junk", 40.0, "#8b4513"),
    ]
    .into_iter()
    .map(|(name, weight, color)| RarityConfig {
        name: name.to_string(),
        weight,
        color: color.to_string(),
    })
    .collect()
}

impl Default for FishingConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            no_catch_chance: DEFAULT_NO_CATCH_CHANCE,
            member_catch_ratio: DEFAULT_MEMBER_CATCH_RATIO,
            contest_countdown_seconds: DEFAULT_CONTEST_COUNTDOWN_SECONDS,
            rarities: default_rarities(),
            fish: Vec::new(),
        }
    }
}

impl FishingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the document into an immutable [`Settings`] snapshot.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        Settings::try_from(self)
    }
}

/// A validated configuration snapshot the engine runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub catalog: Catalog,
    pub no_catch_chance: f64,
    pub member_catch_ratio: u32,
    pub cooldown: Duration,
    pub contest_countdown: Duration,
}

impl Settings {
    pub fn member_catch_chance(&self) -> f64 {
        if self.member_catch_ratio == 0 {
            0.0
        } else {
            1.0 / self.member_catch_ratio as f64
        }
    }
}

impl TryFrom<&FishingConfig> for Settings {
    type Error = ConfigError;

    fn try_from(config: &FishingConfig) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&config.no_catch_chance) {
            return Err(ConfigError::InvalidProbability {
                name: "no_catch_chance",
                value: config.no_catch_chance,
            });
        }

        let tiers = config
            .rarities
            .iter()
            .map(|rarity| {
                let color =
                    parse_color(&rarity.color).ok_or_else(|| ConfigError::InvalidColor {
                        rarity: rarity.name.clone(),
                        color: rarity.color.clone(),
                    })?;

                Ok(Rarity {
                    name: rarity.name.clone(),
                    weight: rarity.weight,
                    color,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let rarities = RarityTable::new(tiers)?;

        let items = config
            .fish
            .iter()
            .map(|fish| Item {
                name: fish.name.clone(),
                rarity: fish.rarity.clone(),
                size_cm: Span::new(fish.min_size_cm, fish.max_size_cm),
                weight_kg: Span::new(fish.min_weight_kg, fish.max_weight_kg),
                description: fish.description.clone(),
            })
            .collect();
        let catalog = Catalog::new(items, rarities)?;

        Ok(Self {
            catalog,
            no_catch_chance: config.no_catch_chance,
            member_catch_ratio: config.member_catch_ratio,
            cooldown: seconds("cooldown_seconds", config.cooldown_seconds)?,
            contest_countdown: seconds(
                "contest_countdown_seconds",
                config.contest_countdown_seconds,
            )?,
        })
    }
}

fn seconds(name: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value > MAX_CONFIG_SECONDS {
        return Err(ConfigError::DurationTooLong {
            name,
            value,
            max: MAX_CONFIG_SECONDS,
        });
    }

    Ok(Duration::seconds(value as i64))
}
