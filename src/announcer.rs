//! Turns contest transitions into Discord threads and announcements.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use database::models::ContestSummary;
use eyre::{Result, WrapErr};
use fishing_engine::{Contest, ContestStatus, Transition};
use log::{debug, error, info, warn};
use serenity::{
    builder::{CreateEmbed, CreateEmbedFooter, CreateMessage, CreateThread, EditThread},
    http::Http,
    model::channel::{AutoArchiveDuration, ChannelType},
};
use tokio::{select, sync::Notify};

use crate::{
    db_id,
    render::{self, GOLD, GREEN, RED},
    Bot, Room,
};

const TICK: Duration = Duration::from_secs(5);

pub async fn run(bot: Arc<Bot>, http: Arc<Http>, quit: Arc<Notify>) {
    info!("Starting contest announcer");

    let mut interval = tokio::time::interval(TICK);
    let quit = quit.notified();
    tokio::pin!(quit);

    loop {
        select! {
            _ = interval.tick() => {
                for transition in bot.engine.tick(Utc::now()) {
                    if let Err(err) = announce(&bot, &http, transition).await {
                        error!("Could not announce contest #{}: {err:?}", transition.contest);
                    }
                }
            }
            _ = &mut quit => {
                debug!("Stopping contest announcer");
                break;
            }
        }
    }
}

async fn announce(bot: &Bot, http: &Arc<Http>, transition: Transition) -> Result<()> {
    debug!(
        "Contest #{} went from {} to {}",
        transition.contest, transition.from, transition.to
    );

    let Some(contest) = bot.engine.contest(transition.contest) else {
        return Ok(());
    };
    // cancelled contests are wrapped up by the cancel command
    if contest.cancelled {
        return Ok(());
    }
    let Some(room) = bot.room(contest.id) else {
        warn!("No channel known for contest #{}", contest.id);
        return Ok(());
    };

    match transition.to {
        ContestStatus::Starting => open_thread(bot, http, &contest, &room).await,
        ContestStatus::Active => start(bot, http, &contest, &room).await,
        ContestStatus::Ended => finish(bot, http, &contest, &room).await,
        ContestStatus::Scheduled => Ok(()),
    }
}

async fn open_thread(bot: &Bot, http: &Arc<Http>, contest: &Contest, room: &Room) -> Result<()> {
    let prefix = &bot.config.prefix;

    let thread = room
        .channel
        .create_thread(
            http,
            CreateThread::new(render::thread_name(&format!("🎣 {} [WAITING]", room.name)))
                .kind(ChannelType::PublicThread)
                .auto_archive_duration(AutoArchiveDuration::OneDay)
                .invitable(false),
        )
        .await
        .wrap_err("could not create contest thread")?;
    info!("Opened thread {} for contest #{}", thread.id, contest.id);

    bot.set_thread(contest.id, thread.id);
    database::set_contest_thread(&bot.db, db_id(contest.id), &thread.id.to_string()).await?;

    let warning = CreateEmbed::new()
        .title("⚠️ Contest Not Started Yet!")
        .description(render::contest_warning(contest.start_time))
        .color(RED);
    thread
        .id
        .send_message(http, CreateMessage::new().embed(warning))
        .await?;

    let rules = CreateEmbed::new()
        .title(format!("🎣 {}", room.name))
        .description(render::contest_rules(
            contest.start_time,
            contest.duration,
            prefix,
        ))
        .color(RED);
    thread
        .id
        .send_message(http, CreateMessage::new().embed(rules))
        .await?;

    if !contest.participants.is_empty() {
        thread
            .id
            .say(
                http,
                format!(
                    "{}\n🎣 **Contest starting soon!** Get ready in this thread.",
                    render::mentions(contest.participants.iter().copied())
                ),
            )
            .await?;
    }

    room.channel
        .say(
            http,
            format!(
                "🎣 The fishing contest starts {} in <#{}>!",
                render::relative_time(contest.start_time),
                thread.id
            ),
        )
        .await?;

    Ok(())
}

async fn start(bot: &Bot, http: &Arc<Http>, contest: &Contest, room: &Room) -> Result<()> {
    let Some(thread) = room.thread else {
        warn!("Contest #{} started without a thread", contest.id);
        return Ok(());
    };

    if let Err(err) = thread
        .edit_thread(
            http,
            EditThread::new().name(render::thread_name(&format!("🎣 {} [ACTIVE]", room.name))),
        )
        .await
    {
        warn!("Could not rename thread of contest #{}: {err}", contest.id);
    }

    if !contest.participants.is_empty() {
        thread
            .say(
                http,
                format!(
                    "{}\n**GO GO GO!** 🎣",
                    render::mentions(contest.participants.iter().copied())
                ),
            )
            .await?;
    }

    let embed = CreateEmbed::new()
        .title("🎣 CONTEST HAS STARTED! 🎣")
        .description(render::contest_started(contest.end_time(), &bot.config.prefix))
        .footer(CreateEmbedFooter::new("May the best angler win! 🏆"))
        .color(GREEN);
    thread
        .send_message(http, CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}

async fn finish(bot: &Bot, http: &Arc<Http>, contest: &Contest, room: &Room) -> Result<()> {
    let standings = bot.engine.leaderboard(contest.id)?;
    let winner = standings
        .first()
        .map(|standing| (standing, bot.name_of(standing.user)));

    database::finish_contest(
        &bot.db,
        db_id(contest.id),
        &ContestSummary {
            winner_id: winner.as_ref().map(|(standing, _)| standing.user.to_string()),
            winner_name: winner.as_ref().map(|(_, name)| name.clone()),
            total_participants: standings.len() as i64,
            total_catches: contest.catches.len() as i64,
            cancelled: false,
            ended_at: contest.ended_at.unwrap_or_else(Utc::now),
        },
    )
    .await?;

    let mut embed = CreateEmbed::new().title("🏆 Contest Results").color(GOLD);
    match &winner {
        Some((standing, name)) => {
            embed = embed.field(
                "🥇 WINNER",
                format!(
                    "**{name}** with {} points ({} catches)!",
                    render::thousands(standing.points),
                    standing.catches
                ),
                false,
            );
        }
        None => {
            embed = embed.field("Results", "No fish were caught during this contest!", false);
        }
    }
    if standings.len() > 1 {
        let names: Vec<_> = standings
            .iter()
            .take(3)
            .map(|standing| bot.name_of(standing.user))
            .collect();
        embed = embed.field(
            "Top Anglers",
            render::ranking(
                standings
                    .iter()
                    .zip(&names)
                    .map(|(standing, name)| (name.as_str(), standing.points, standing.catches as u64)),
            ),
            false,
        );
    }
    embed = embed.field(
        "Contest Stats",
        format!(
            "**Participants:** {}\n**Total Catches:** {}",
            standings.len(),
            contest.catches.len()
        ),
        false,
    );

    let target = room.thread.unwrap_or(room.channel);
    target
        .send_message(http, CreateMessage::new().embed(embed))
        .await?;
    info!(
        "Contest #{} ended, winner: {}",
        contest.id,
        winner.as_ref().map_or("nobody", |(_, name)| name.as_str())
    );

    if let Some(thread) = room.thread {
        let name = render::finished_thread_name(
            contest,
            winner.as_ref().map(|(_, name)| name.as_str()),
        );
        if let Err(err) = thread
            .edit_thread(
                http,
                EditThread::new()
                    .name(name)
                    .locked(true)
                    .archived(true)
                    .audit_log_reason("Fishing contest ended"),
            )
            .await
        {
            warn!("Could not archive thread of contest #{}: {err}", contest.id);
        }
    }

    bot.close_room(contest.id);

    Ok(())
}
