#![forbid(unsafe_code)]

mod catalog;
pub mod contest;
mod cooldown;
mod engine;
mod rarity;
mod recency;
pub mod sampler;
pub mod score;
mod settings;

pub use catalog::{Catalog, Item, Span};
pub use contest::{Contest, ContestError, ContestId, ContestStatus, Standing, Transition};
pub use cooldown::CooldownGate;
pub use engine::{Attempt, CatchEvent, Engine};
pub use rarity::{parse_color, Rarity, RarityTable};
pub use recency::{RecencyWindow, RecentCatches, RECENCY_CAPACITY};
pub use sampler::{CatchOutcome, ItemCatch, Member, MemberCatch};
pub use settings::{
    ConfigError, FishConfig, FishingConfig, RarityConfig, Settings, CONTEST_BONUS,
    MAX_CONFIG_SECONDS,
};

/// Platform identifier of a user.
pub type UserId = u64;
