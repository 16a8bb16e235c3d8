use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest cooldown an admin may configure.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(60 * 60);

const DEFAULT_CONTEST_DURATION: Duration = Duration::from_secs(10 * 60);
const DEFAULT_CONTEST_DELAY: Duration = Duration::from_secs(5 * 60);
const MAX_CONTEST_TIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

static COMMAND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[a-zA-Z]+)(?:\s+(?P<args>.*))?$").unwrap());
static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@!?(?P<id>\d+)>$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fish,
    FishStats { target: Option<u64> },
    FishList,
    FishInfo { name: String },
    FishHelp,
    FishAdmin,
    AddFish(NewFish),
    SetFishCooldown { cooldown: Duration },
    FishCooldown,
    ReloadFishConfig,
    FPlayer,
    StartContest { duration: Duration, delay: Duration },
    JoinContest,
    ContestInfo,
    ContestLeaderboard,
    PastContests,
    ContestResults { id: u64 },
    CancelContest,
    ContestHelp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFish {
    pub name: String,
    pub min_size_cm: f64,
    pub max_size_cm: f64,
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    pub rarity: Option<String>,
}

/// A recognised command with unusable arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid time format. Use formats like: 30s, 5m, 1m30s, 1h")]
    InvalidDuration,

    #[error("Cooldown cannot exceed 1 hour")]
    CooldownTooLong,

    #[error("Min values must be less than max values")]
    InvertedRange,
}

impl Command {
    /// Parses `text` if it starts with `prefix` and names a known command.
    pub fn parse(prefix: &str, text: &str) -> Option<Result<Self, ParseError>> {
        let captures = COMMAND_REGEX.captures(text.trim().strip_prefix(prefix)?)?;
        let args = captures.name("args").map_or("", |m| m.as_str().trim());

        let command = match captures["name"].to_lowercase().as_str() {
            "fish" | "f" | "cast" | "fishing" => Ok(Self::Fish),
            "fishstats" => Ok(Self::FishStats {
                target: parse_mention(args),
            }),
            "fishlist" => Ok(Self::FishList),
            "fishinfo" => match args {
                "" => Err(ParseError::Usage("!fishinfo <FishName>")),
                name => Ok(Self::FishInfo {
                    name: name.to_string(),
                }),
            },
            "fishhelp" | "fishinghelp" => Ok(Self::FishHelp),
            "fishadmin" | "fishingadmin" => Ok(Self::FishAdmin),
            "addfish" => parse_new_fish(args).map(Self::AddFish),
            "setfishcooldown" => parse_cooldown(args).map(|cooldown| Self::SetFishCooldown { cooldown }),
            "fishcooldown" => Ok(Self::FishCooldown),
            "reloadfishconfig" => Ok(Self::ReloadFishConfig),
            "fplayer" => Ok(Self::FPlayer),
            "startcontest" => parse_contest_times(args),
            "joincontest" => Ok(Self::JoinContest),
            "contestinfo" => Ok(Self::ContestInfo),
            "contestlb" => Ok(Self::ContestLeaderboard),
            "pastcontests" => Ok(Self::PastContests),
            "contestresults" => args
                .trim_start_matches('#')
                .parse()
                .map(|id| Self::ContestResults { id })
                .map_err(|_| ParseError::Usage("!contestresults <id>")),
            "cancelcontest" => Ok(Self::CancelContest),
            "contesthelp" => Ok(Self::ContestHelp),
            _ => return None,
        };

        Some(command)
    }

    /// Commands reserved for members who can manage the server.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::FishAdmin
                | Self::AddFish(_)
                | Self::SetFishCooldown { .. }
                | Self::FishCooldown
                | Self::ReloadFishConfig
                | Self::FPlayer
                | Self::StartContest { .. }
                | Self::CancelContest
        )
    }
}

fn parse_mention(args: &str) -> Option<u64> {
    let first = args.split_whitespace().next()?;

    MENTION_REGEX
        .captures(first)
        .and_then(|captures| captures["id"].parse().ok())
}

const ADD_FISH_USAGE: &str =
    "!addfish <FishName> <MinSizeCM> <MaxSizeCM> <MinWeightKG> <MaxWeightKG> [Rarity]";

fn parse_new_fish(args: &str) -> Result<NewFish, ParseError> {
    let parts: Vec<_> = args.split_whitespace().collect();
    let (name, numbers, rarity) = match parts.as_slice() {
        [name, a, b, c, d] => (*name, [*a, *b, *c, *d], None),
        [name, a, b, c, d, rarity] => (*name, [*a, *b, *c, *d], Some(rarity.to_lowercase())),
        _ => return Err(ParseError::Usage(ADD_FISH_USAGE)),
    };

    let mut values = [0.0; 4];
    for (value, number) in values.iter_mut().zip(numbers) {
        *value = number
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ParseError::Usage(ADD_FISH_USAGE))?;
    }
    let [min_size_cm, max_size_cm, min_weight_kg, max_weight_kg] = values;

    if min_size_cm >= max_size_cm || min_weight_kg >= max_weight_kg {
        return Err(ParseError::InvertedRange);
    }

    Ok(NewFish {
        name: name.to_string(),
        min_size_cm,
        max_size_cm,
        min_weight_kg,
        max_weight_kg,
        rarity,
    })
}

fn parse_cooldown(args: &str) -> Result<Duration, ParseError> {
    if args.is_empty() {
        return Err(ParseError::Usage(
            "!setfishcooldown <time> (e.g., 30s, 5m, 1m30s, 0 to disable)",
        ));
    }
    if args == "0" {
        return Ok(Duration::ZERO);
    }

    let cooldown = humantime::parse_duration(args).map_err(|_| ParseError::InvalidDuration)?;
    if cooldown > MAX_COOLDOWN {
        return Err(ParseError::CooldownTooLong);
    }

    Ok(cooldown)
}

fn parse_contest_times(args: &str) -> Result<Command, ParseError> {
    let mut parts = args.split_whitespace();
    let mut next = |default| match parts.next() {
        Some(part) => humantime::parse_duration(part)
            .ok()
            .filter(|duration| !duration.is_zero() && *duration <= MAX_CONTEST_TIME)
            .ok_or(ParseError::InvalidDuration),
        None => Ok(default),
    };

    let duration = next(DEFAULT_CONTEST_DURATION)?;
    let delay = next(DEFAULT_CONTEST_DELAY)?;

    Ok(Command::StartContest { duration, delay })
}
