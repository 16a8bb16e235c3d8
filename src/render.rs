//! Message texts shown to users.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use database::models::{Catch, Contest as ContestRecord, UserStats, FISH};
use fishing_engine::{Catalog, Contest, ContestStatus, Item, ItemCatch, MemberCatch};

/// Discord's limit for a single message.
pub const MESSAGE_LIMIT: usize = 2000;

pub const BLUE: u32 = 0x3498db;
pub const GOLD: u32 = 0xf1c40f;
pub const GREEN: u32 = 0x2ecc71;
pub const RED: u32 = 0xe74c3c;
pub const TEAL: u32 = 0x1abc9c;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0) as u64;
    humantime::format_duration(StdDuration::from_secs(secs)).to_string()
}

pub fn cooldown_setting(cooldown: Duration) -> String {
    if cooldown <= Duration::zero() {
        "disabled".to_string()
    } else {
        format_duration(cooldown)
    }
}

pub fn cooldown_message(remaining: Duration) -> String {
    // round up so we never tell someone to wait 0s
    let remaining = Duration::seconds((remaining.num_milliseconds() + 999) / 1000);
    format!(
        "🎣 You need to wait **{}** before fishing again!",
        format_duration(remaining)
    )
}

pub fn relative_time(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

pub fn full_time(at: DateTime<Utc>) -> String {
    format!("<t:{}:F>", at.timestamp())
}

/// `1234567` as `1,234,567`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }

    out
}

pub fn medal(rank: usize) -> String {
    MEDALS
        .get(rank)
        .map_or_else(|| format!("{}.", rank + 1), |medal| medal.to_string())
}

/// One line per angler, best first.
pub fn ranking<'a>(rows: impl IntoIterator<Item = (&'a str, u64, u64)>) -> String {
    rows.into_iter()
        .enumerate()
        .map(|(rank, (name, points, catches))| {
            format!(
                "{} **{name}** — {} pts ({catches} fish)",
                medal(rank),
                thousands(points)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn item_catch(fisher: &str, catch: &ItemCatch, rarity: &str, contest: bool) -> String {
    let mut text = format!(
        "**{fisher}** caught a **{}**!\n\
         Rarity: **{rarity}**\n\
         Size: **{} cm**\n\
         Weight: **{} kg**\n\
         Points: **{}**",
        catch.name,
        catch.size_cm,
        catch.weight_kg,
        thousands(u64::from(catch.points))
    );

    if contest {
        text.push_str(" (contest bonus)");
    }

    text
}

pub fn member_catch(fisher: &str, catch: &MemberCatch) -> String {
    format!(
        "**{fisher}** reeled in **{}**!\n\
         Weight: **{} kg** ({:.1} lbs)\n\
         Points: **{}**",
        catch.member.name,
        catch.weight_kg,
        catch.weight_kg * 2.2,
        thousands(u64::from(catch.points))
    )
}

pub fn nothing_caught(fisher: &str) -> String {
    format!("🎣 **{fisher}** cast their line but caught nothing. Better luck next time!")
}

/// The catalog as a table, split into messages that fit the size limit.
pub fn fish_table(catalog: &Catalog, prefix: &str) -> Vec<String> {
    let mut rows = vec![
        format!(
            "| {:<20}| {:<16}| {:<14}| {:<14}|",
            "Fish Name", "Rarity", "Size (cm)", "Weight (kg)"
        ),
        format!("|{:-<21}|{:-<17}|{:-<15}|{:-<15}|", "", "", "", ""),
    ];

    let mut items: Vec<_> = catalog.items().iter().collect();
    items.sort_by_key(|item| item.name.to_lowercase());

    for item in items {
        let name: String = item.name.chars().take(20).collect();
        let rarity = catalog.rarity_of(item).to_string();
        rows.push(format!(
            "| {name:<20}| {rarity:<16}| {:<14}| {:<14}|",
            item.size_cm.to_string(),
            item.weight_kg.to_string()
        ));
    }

    let header = format!("**Available Fish ({} total):**", catalog.len());
    let footer = format!("_Use `{prefix}fishinfo <FishName>` to see the card for any fish!_");
    let fence = "```markdown\n";

    let mut messages = vec![header];
    for chunk in split_message(&rows.join("\n"), MESSAGE_LIMIT - fence.len() - 4) {
        messages.push(format!("{fence}{chunk}\n```"));
    }
    messages.push(footer);

    // a short table fits in one message
    let joined = messages.join("\n");
    if joined.len() <= MESSAGE_LIMIT {
        vec![joined]
    } else {
        messages
    }
}

pub fn fish_card(catalog: &Catalog, item: &Item) -> String {
    let mut text = format!(
        "**Rarity:** {}\n\
         **Size Range:** {} cm\n\
         **Weight Range:** {} kg\n\
         **Chance:** {:.2}% of fish caught\n\
         **Max Points:** ~{}",
        catalog.rarity_of(item),
        item.size_cm,
        item.weight_kg,
        catalog.chance(item) * 100.0,
        thousands(u64::from(item.theoretical_max()))
    );

    if !item.description.is_empty() {
        text.push_str("\n\n");
        text.push_str(&item.description);
    }

    text
}

pub fn fish_not_found(catalog: &Catalog, query: &str) -> String {
    let suggestions: Vec<_> = catalog
        .search(query)
        .take(5)
        .map(|item| item.name.as_str())
        .collect();

    if suggestions.is_empty() {
        format!("No fish named '{query}' found.")
    } else {
        format!(
            "No exact match for '{query}'. Did you mean: {}?",
            suggestions.join(", ")
        )
    }
}

pub fn fish_help(prefix: &str, cooldown: Duration) -> String {
    format!(
        "🎣 **__Fishing Game Commands__** 🎣\n\n\
         🐟 **Player Commands:**\n\
         • 🎣 **{p}fish** / **{p}f** / **{p}cast** / **{p}fishing** — Go fishing and try to catch a fish!\n\
         • 🏆 **{p}fishstats [@user]** — View the fishing leaderboard and your (or another user's) stats.\n\
         • 📜 **{p}fishlist** — List all fish and their stats in a table.\n\
         • ℹ️ **{p}fishinfo <FishName>** — Show info and image for a specific fish.\n\
         • ❓ **{p}fishhelp** / **{p}fishinghelp** — Show this help message.\n\
         • 🏁 **{p}contesthelp** — Fishing contest commands.\n\n\
         🛠️ **Admin Commands:** see **{p}fishadmin**\n\n\
         Current cooldown: **{}**",
        cooldown_setting(cooldown),
        p = prefix,
    )
}

pub fn fish_admin_help(prefix: &str, assets_dir: &str, config_file: &str) -> String {
    format!(
        "🛠️ **__Fishing Game Admin Commands__** 🛠️\n\n\
         • ➕ **{p}addfish <FishName> <MinSizeCM> <MaxSizeCM> <MinWeightKG> <MaxWeightKG> [Rarity]**\n\
         \u{20} Add a new fish to the config (image must be uploaded first).\n\n\
         • ⏱️ **{p}setfishcooldown <time>**\n\
         \u{20} Set fishing cooldown time (e.g., 30s, 5m, 1m30s, 0 to disable).\n\n\
         • ⏱️ **{p}fishcooldown**\n\
         \u{20} Show current fishing cooldown setting.\n\n\
         • 🔄 **{p}reloadfishconfig**\n\
         \u{20} Re-read the fishing config file.\n\n\
         • 👤 **{p}fplayer**\n\
         \u{20} Test fishing for a random server member.\n\n\
         All fish images must be placed in the `{assets_dir}` folder before adding them with `{p}addfish`.\n\
         Fish stats, rarities, member catch ratio and cooldown live in `{config_file}`.",
        p = prefix,
    )
}

pub fn contest_help(prefix: &str) -> String {
    format!(
        "🎣 **__Fishing Contest Commands__** 🎣\n\n\
         **Player Commands:**\n\
         • 📋 **{p}joincontest** — Join the upcoming fishing contest\n\
         • ℹ️ **{p}contestinfo** — Show current/next contest information\n\
         • 🏆 **{p}contestlb** — Show live contest leaderboard\n\
         • 📜 **{p}pastcontests** — List past fishing contests\n\
         • 📊 **{p}contestresults <id>** — Show detailed results for a specific contest\n\
         • ❓ **{p}contesthelp** — Show this help message\n\n\
         **Admin Commands:**\n\
         • 🎮 **{p}startcontest <duration> <delay>** — Schedule a fishing contest\n\
         \u{20} Example: `{p}startcontest 10m 5m` (10 min contest starting in 5 min)\n\
         • ❌ **{p}cancelcontest** — Cancel the current fishing contest\n\n\
         **Contest Rules:**\n\
         • All catches during contests earn **50% bonus points**\n\
         • **NO COOLDOWNS** during contests - fish as fast as you can!\n\
         • Contests run in dedicated threads\n\
         • Join before the contest starts to get pinged!",
        p = prefix,
    )
}

pub fn contest_scheduled(start: DateTime<Utc>, duration: Duration, channel: &str, prefix: &str) -> String {
    format!(
        "**Start Time:** {} ({})\n\
         **Duration:** {}\n\
         **Channel:** {channel}\n\n\
         Use `{prefix}joincontest` to participate!\n\
         A thread will be created shortly before the contest starts.",
        full_time(start),
        relative_time(start),
        format_duration(duration),
    )
}

pub fn contest_warning(start: DateTime<Utc>) -> String {
    format!(
        "This thread is for the upcoming fishing contest.\n\
         **DO NOT FISH YET!**\n\n\
         Contest starts: {}\n\n\
         Any fish caught before the official start will NOT count!",
        relative_time(start)
    )
}

pub fn contest_rules(start: DateTime<Utc>, duration: Duration, prefix: &str) -> String {
    format!(
        "**Duration:** {}\n\
         **Start Time:** {}\n\n\
         **⚠️ DO NOT FISH YET! Wait for the START announcement!**\n\n\
         **Rules:**\n\
         • All catches during the contest earn **50% bonus points**\n\
         • The angler with the most total points wins\n\
         • **NO COOLDOWNS** - fish as fast as you can!\n\
         • Use `{prefix}fish` in this thread to participate\n\
         • Use `{prefix}contestlb` to see live standings\n\n\
         **Good luck, anglers!** 🐟",
        format_duration(duration),
        relative_time(start),
    )
}

pub fn contest_started(end: DateTime<Utc>, prefix: &str) -> String {
    format!(
        "# 🐟 FISH NOW! 🐟\n\n\
         The contest is officially underway!\n\
         **Start fishing with `{prefix}fish`**\n\
         **Check standings with `{prefix}contestlb`**\n\n\
         Contest ends {}",
        relative_time(end)
    )
}

pub fn angler_stats(stats: &UserStats, biggest: Option<&Catch>) -> String {
    let mut text = format!(
        "**Total Catches:** {}\n**Total Points:** {}",
        stats.catches,
        thousands(stats.total_points.max(0) as u64)
    );

    if let Some(catch) = biggest {
        let size = catch
            .size
            .map(|size| format!("{size} cm, "))
            .unwrap_or_default();
        text.push_str(&format!(
            "\n**Biggest Catch:** {} ({size}{} kg, {} pts)",
            catch.catch_name,
            catch.weight,
            thousands(catch.points.max(0) as u64)
        ));
        if catch.catch_type != FISH {
            text.push_str(" 👤");
        }
    }

    text
}

/// The open contest as shown by the info command.
pub fn contest_status(contest: &Contest, prefix: &str) -> String {
    let (status, when) = match contest.status {
        ContestStatus::Scheduled => ("📅 Scheduled", format!("Starts {}", relative_time(contest.start_time))),
        ContestStatus::Starting => ("⏳ Starting soon", format!("Starts {}", relative_time(contest.start_time))),
        ContestStatus::Active => ("🎣 Active", format!("Ends {}", relative_time(contest.end_time()))),
        ContestStatus::Ended => ("🏁 Ended", "Results are in!".to_string()),
    };

    let mut text = format!(
        "**Status:** {status}\n\
         {when}\n\
         **Duration:** {}\n\
         **Participants:** {}",
        format_duration(contest.duration),
        contest.participants.len()
    );

    match contest.status {
        ContestStatus::Scheduled => {
            text.push_str(&format!("\n\nUse `{prefix}joincontest` to participate!"));
        }
        ContestStatus::Active => {
            text.push_str(&format!("\n**Catches so far:** {}", contest.catches.len()));
        }
        _ => {}
    }

    text
}

pub fn past_contest(contest: &ContestRecord) -> String {
    let date = contest.start_time.format("%Y-%m-%d %H:%M");

    if contest.cancelled {
        return format!("**#{}** {date} UTC — ❌ cancelled", contest.id);
    }

    let winner = contest.winner_name.as_deref().unwrap_or("nobody");
    format!(
        "**#{}** {date} UTC — 🏆 {winner} ({} anglers, {} catches)",
        contest.id, contest.total_participants, contest.total_catches
    )
}

/// Name of a finished contest's thread.
pub fn finished_thread_name(contest: &Contest, winner: Option<&str>) -> String {
    let name = format!(
        "🎣 Contest #{} - {} - Winner: {}",
        contest.id,
        contest.start_time.format("%Y-%m-%d"),
        winner.unwrap_or("nobody")
    );

    thread_name(&name)
}

/// Discord caps thread names at 100 characters.
pub fn thread_name(name: &str) -> String {
    name.chars().take(100).collect()
}

pub fn mentions(users: impl IntoIterator<Item = u64>) -> String {
    users
        .into_iter()
        .map(|user| format!("<@{user}>"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits on line breaks so every chunk stays within `max_length` bytes.
pub fn split_message(content: &str, max_length: usize) -> Vec<String> {
    if content.len() <= max_length {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > max_length {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() > max_length {
            let mut piece = String::new();
            for c in line.chars() {
                if piece.len() + c.len_utf8() > max_length {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(c);
            }
            current = piece;
            continue;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use fishing_engine::{FishConfig, FishingConfig, Member};
    use test_case::test_case;

    use super::*;

    fn catalog(count: usize) -> Catalog {
        FishingConfig {
            fish: (0..count)
                .map(|i| FishConfig {
                    name: format!("Fish number {i}"),
                    rarity: "common".to_string(),
                    min_size_cm: 10.0,
                    max_size_cm: 20.5,
                    min_weight_kg: 0.25,
                    max_weight_kg: 1.5,
                    description: String::new(),
                })
                .collect(),
            ..FishingConfig::default()
        }
        .validate()
        .unwrap()
        .catalog
    }

    #[test_case(0, "0" ; "zero")]
    #[test_case(999, "999" ; "small")]
    #[test_case(1_000, "1,000" ; "thousand")]
    #[test_case(1_234_567, "1,234,567" ; "million")]
    fn thousands_separator(value: u64, expected: &str) {
        assert_eq!(thousands(value), expected);
    }

    #[test_case(Duration::seconds(0), "disabled" ; "disabled")]
    #[test_case(Duration::seconds(45), "45s" ; "seconds")]
    #[test_case(Duration::seconds(90), "1m 30s" ; "minutes")]
    fn cooldown_display(cooldown: Duration, expected: &str) {
        assert_eq!(cooldown_setting(cooldown), expected);
    }

    #[test]
    fn cooldown_rounds_up() {
        assert_eq!(
            cooldown_message(Duration::milliseconds(19_200)),
            "🎣 You need to wait **20s** before fishing again!"
        );
    }

    #[test]
    fn ranking_uses_medals_then_numbers() {
        let text = ranking([("a", 1500, 3), ("b", 20, 1), ("c", 10, 1), ("d", 5, 1)]);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "🥇 **a** — 1,500 pts (3 fish)");
        assert!(lines[2].starts_with("🥉"));
        assert!(lines[3].starts_with("4. **d**"));
    }

    #[test]
    fn member_catch_shows_pounds() {
        let catch = MemberCatch {
            member: Member {
                id: 2,
                name: "Bob".to_string(),
                is_bot: false,
            },
            weight_kg: 80.0,
            points: 1176,
        };

        assert_eq!(
            member_catch("Alice", &catch),
            "**Alice** reeled in **Bob**!\nWeight: **80 kg** (176.0 lbs)\nPoints: **1,176**"
        );
    }

    #[test]
    fn small_table_is_one_message() {
        let messages = fish_table(&catalog(3), "!");

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Fish number 2"));
        assert!(messages[0].contains("10–20.5"));
        assert!(messages[0].contains("Common"));
        assert!(messages[0].contains("`!fishinfo <FishName>`"));
    }

    #[test]
    fn large_table_is_split() {
        let messages = fish_table(&catalog(80), "?");

        assert!(messages.len() > 3);
        assert!(messages.iter().all(|message| message.len() <= MESSAGE_LIMIT));
        assert!(messages[1].starts_with("```markdown\n| Fish Name"));
        assert_eq!(
            messages.last().map(String::as_str),
            Some("_Use `?fishinfo <FishName>` to see the card for any fish!_")
        );
    }

    #[test]
    fn card_lists_chance_and_max() {
        let catalog = catalog(4);
        let card = fish_card(&catalog, &catalog.items()[0]);

        assert!(card.contains("**Chance:** 25.00%"));
        assert!(card.contains("**Max Points:** ~36"));
    }

    #[test]
    fn suggestions_for_partial_names() {
        let catalog = catalog(2);

        assert_eq!(
            fish_not_found(&catalog, "number"),
            "No exact match for 'number'. Did you mean: Fish number 0, Fish number 1?"
        );
        assert_eq!(fish_not_found(&catalog, "shark"), "No fish named 'shark' found.");
    }

    #[test]
    fn split_respects_limit() {
        let text = (0..50).map(|i| format!("line {i:03}")).collect::<Vec<_>>().join("\n");

        let chunks = split_message(&text, 40);

        assert!(chunks.iter().all(|chunk| chunk.len() <= 40));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn split_breaks_long_lines() {
        let chunks = split_message(&"ab".repeat(30), 25);

        assert!(chunks.iter().all(|chunk| chunk.len() <= 25));
        assert_eq!(chunks.concat(), "ab".repeat(30));
    }

    fn record(cancelled: bool) -> ContestRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();

        ContestRecord {
            id: 7,
            name: "Fishing Contest".to_string(),
            start_time: start,
            end_time: start + Duration::minutes(10),
            channel_id: None,
            thread_id: None,
            created_by: "1".to_string(),
            winner_id: Some("2".to_string()),
            winner_name: Some("Alice".to_string()),
            total_participants: 3,
            total_catches: 41,
            cancelled,
            ended_at: Some(start + Duration::minutes(10)),
        }
    }

    #[test]
    fn past_contest_lines() {
        assert_eq!(
            past_contest(&record(false)),
            "**#7** 2024-03-01 18:30 UTC — 🏆 Alice (3 anglers, 41 catches)"
        );
        assert_eq!(
            past_contest(&record(true)),
            "**#7** 2024-03-01 18:30 UTC — ❌ cancelled"
        );
    }

    #[test]
    fn stats_include_biggest_catch() {
        let stats = UserStats {
            catches: 12,
            total_points: 4321,
        };
        let biggest = Catch {
            id: 1,
            user_id: "1".to_string(),
            user_name: "Alice".to_string(),
            catch_type: FISH.to_string(),
            catch_name: "Pike".to_string(),
            rarity: Some("rare".to_string()),
            size: Some(98.5),
            weight: 9.25,
            points: 188,
            timestamp: Utc::now(),
            contest_id: None,
        };

        assert_eq!(
            angler_stats(&stats, Some(&biggest)),
            "**Total Catches:** 12\n**Total Points:** 4,321\n**Biggest Catch:** Pike (98.5 cm, 9.25 kg, 188 pts)"
        );
        assert_eq!(
            angler_stats(&UserStats::default(), None),
            "**Total Catches:** 0\n**Total Points:** 0"
        );
    }

    #[test]
    fn status_invites_only_while_scheduled() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
        let mut contest = Contest {
            id: 3,
            status: ContestStatus::Scheduled,
            created_at: start - Duration::minutes(5),
            start_time: start,
            duration: Duration::minutes(10),
            participants: [1, 2].into_iter().collect(),
            catches: Vec::new(),
            cancelled: false,
            ended_at: None,
        };

        let scheduled = contest_status(&contest, "!");
        assert!(scheduled.contains("**Participants:** 2"));
        assert!(scheduled.contains("`!joincontest`"));

        contest.status = ContestStatus::Active;
        let active = contest_status(&contest, "!");
        assert!(active.contains(&format!("Ends <t:{}:R>", contest.end_time().timestamp())));
        assert!(active.contains("**Catches so far:** 0"));
        assert!(!active.contains("joincontest"));
    }

    #[test]
    fn thread_names_are_capped() {
        assert_eq!(thread_name(&"🎣".repeat(150)).chars().count(), 100);
        assert_eq!(thread_name("short"), "short");
    }

    #[test]
    fn mentions_join_users() {
        assert_eq!(mentions([1, 22]), "<@1> <@22>");
    }
}
