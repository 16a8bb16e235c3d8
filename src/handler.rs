use std::sync::Arc;

use chrono::{Duration, Utc};
use database::models::{ContestSummary, NewCatch, NewContest, FISH, MEMBER};
use eyre::{Result, WrapErr};
use fishing_engine::{
    sampler, Attempt, CatchEvent, CatchOutcome, ContestError, ContestStatus, FishConfig,
};
use log::{debug, error, info, warn};
use serenity::{
    async_trait,
    builder::{CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage, EditThread},
    client::{Context, EventHandler},
    model::{
        channel::{Message, MessageFlags},
        gateway::Ready,
        id::{GuildId, UserId},
    },
};

use crate::{
    assets,
    command::{Command, NewFish},
    config, db_id,
    render::{self, BLUE, GOLD, RED, TEAL},
    Bot, Room,
};

pub struct Handler {
    bot: Arc<Bot>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!(
            "Connected as {} to {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(command) = Command::parse(&self.bot.config.prefix, &msg.content) else {
            return;
        };

        let result = match command {
            Ok(command) => {
                debug!("{} sent {command:?}", msg.author.name);
                self.handle(&ctx, &msg, command).await
            }
            Err(err) => reply(&ctx, &msg, err.to_string()).await,
        };

        if let Err(err) = result {
            error!("Error handling message: {err:?}");

            if let Err(err) = msg
                .channel_id
                .say(&ctx.http, "⚠️ Something went wrong, please try again later.")
                .await
            {
                warn!("Could not report error: {err}");
            }
        }
    }
}

impl Handler {
    async fn handle(&self, ctx: &Context, msg: &Message, command: Command) -> Result<()> {
        if command.requires_admin() && !is_admin(ctx, msg).await? {
            return reply(ctx, msg, "🚫 Only server admins can use this command.").await;
        }

        self.bot.remember_name(msg.author.id.get(), &display_name(msg));
        let prefix = self.bot.config.prefix.as_str();

        match command {
            Command::Fish => self.fish(ctx, msg).await,
            Command::FishStats { target } => self.fish_stats(ctx, msg, target).await,
            Command::FishList => {
                let settings = self.bot.engine.settings();
                for chunk in render::fish_table(&settings.catalog, prefix) {
                    msg.channel_id.say(&ctx.http, chunk).await?;
                }
                Ok(())
            }
            Command::FishInfo { name } => self.fish_info(ctx, msg, &name).await,
            Command::FishHelp => {
                let cooldown = self.bot.engine.settings().cooldown;
                reply(ctx, msg, render::fish_help(prefix, cooldown)).await
            }
            Command::FishAdmin => {
                let text = render::fish_admin_help(
                    prefix,
                    &self.bot.config.assets_dir.display().to_string(),
                    &self.bot.config.fishing_config.display().to_string(),
                );
                reply(ctx, msg, text).await
            }
            Command::AddFish(fish) => self.add_fish(ctx, msg, fish).await,
            Command::SetFishCooldown { cooldown } => {
                let seconds = cooldown.as_secs();
                match self
                    .bot
                    .update_game_config(|game| game.cooldown_seconds = seconds)
                {
                    Ok(()) if seconds == 0 => reply(ctx, msg, "🎣 Fishing cooldown disabled!").await,
                    Ok(()) => {
                        let cooldown = render::cooldown_setting(self.bot.engine.settings().cooldown);
                        reply(ctx, msg, format!("🎣 Fishing cooldown set to **{cooldown}**!")).await
                    }
                    Err(err) => self.config_rejected(ctx, msg, err).await,
                }
            }
            Command::FishCooldown => {
                let cooldown = render::cooldown_setting(self.bot.engine.settings().cooldown);
                reply(ctx, msg, format!("⏱️ Current fishing cooldown: **{cooldown}**")).await
            }
            Command::ReloadFishConfig => match self.bot.reload_game_config() {
                Ok(count) => {
                    reply(ctx, msg, format!("🔄 Reloaded fishing config: {count} fish available.")).await
                }
                Err(err) => self.config_rejected(ctx, msg, err).await,
            },
            Command::FPlayer => self.test_member_catch(ctx, msg).await,
            Command::StartContest { duration, delay } => {
                self.start_contest(ctx, msg, duration, delay).await
            }
            Command::JoinContest => self.join_contest(ctx, msg).await,
            Command::ContestInfo => self.contest_info(ctx, msg).await,
            Command::ContestLeaderboard => self.contest_leaderboard(ctx, msg).await,
            Command::PastContests => self.past_contests(ctx, msg).await,
            Command::ContestResults { id } => self.contest_results(ctx, msg, id).await,
            Command::CancelContest => self.cancel_contest(ctx, msg).await,
            Command::ContestHelp => reply(ctx, msg, render::contest_help(prefix)).await,
        }
    }

    async fn fish(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let now = Utc::now();
        let user = msg.author.id.get();

        if let Some(contest) = self.bot.engine.current_contest(now) {
            let thread = self.bot.room(contest.id).and_then(|room| room.thread);

            match (contest.status, thread) {
                (ContestStatus::Starting, Some(thread)) if msg.channel_id == thread => {
                    return reply(
                        ctx,
                        msg,
                        "⚠️ The contest hasn't started yet! Wait for the START announcement!",
                    )
                    .await;
                }
                (ContestStatus::Active, Some(thread)) if msg.channel_id != thread => {
                    return reply(
                        ctx,
                        msg,
                        format!("🎣 A contest is running! Fish in the contest thread: <#{thread}>"),
                    )
                    .await;
                }
                _ => {}
            }
        }

        let fisher = display_name(msg);
        let members = guild_members(ctx, msg.guild_id);
        let attempt = self
            .bot
            .engine
            .attempt_catch(user, now, &members, &mut rand::thread_rng());

        let event = match attempt {
            Attempt::Caught(event) => event,
            Attempt::Cooldown { remaining } => {
                return reply(ctx, msg, render::cooldown_message(remaining)).await;
            }
        };

        self.record_catch(msg, &fisher, &event).await?;
        self.announce_catch(ctx, msg, &fisher, &event).await
    }

    async fn record_catch(&self, msg: &Message, fisher: &str, event: &CatchEvent) -> Result<()> {
        let (catch_type, catch_name, rarity, size, weight) = match &event.outcome {
            CatchOutcome::Item(catch) => (
                FISH,
                catch.name.clone(),
                Some(catch.rarity.clone()),
                Some(catch.size_cm),
                catch.weight_kg,
            ),
            CatchOutcome::Member(catch) => {
                (MEMBER, catch.member.name.clone(), None, None, catch.weight_kg)
            }
            CatchOutcome::Nothing => return Ok(()),
        };

        database::record_catch(
            &self.bot.db,
            &NewCatch {
                user_id: msg.author.id.to_string(),
                user_name: fisher.to_string(),
                catch_type,
                catch_name,
                rarity,
                size,
                weight,
                points: event.points(),
                timestamp: event.at,
                contest_id: event.contest.map(db_id),
            },
        )
        .await
        .wrap_err("could not record catch")?;

        Ok(())
    }

    async fn announce_catch(
        &self,
        ctx: &Context,
        msg: &Message,
        fisher: &str,
        event: &CatchEvent,
    ) -> Result<()> {
        let in_contest = event.contest.is_some();
        let mut message = CreateMessage::new();
        if in_contest {
            message = message.flags(MessageFlags::SUPPRESS_NOTIFICATIONS);
        }

        let message = match &event.outcome {
            CatchOutcome::Item(catch) => {
                let settings = self.bot.engine.settings();
                let (rarity, color) = settings
                    .catalog
                    .find(&catch.name)
                    .map(|item| {
                        let rarity = settings.catalog.rarity_of(item);
                        (rarity.to_string(), rarity.color)
                    })
                    .unwrap_or_else(|| (catch.rarity.clone(), BLUE));

                let embed = CreateEmbed::new()
                    .title("🎣 You caught a fish!")
                    .description(render::item_catch(fisher, catch, &rarity, in_contest))
                    .color(color);

                self.with_image(message, embed, &catch.name, false).await?
            }
            CatchOutcome::Member(catch) => {
                let mut embed = CreateEmbed::new()
                    .title("🎣 INCREDIBLE! You caught a server member!")
                    .description(render::member_catch(fisher, catch))
                    .color(GOLD);
                if let Some(face) = avatar(ctx, msg.guild_id, catch.member.id) {
                    embed = embed.thumbnail(face);
                }

                message.embed(embed)
            }
            CatchOutcome::Nothing => message.content(render::nothing_caught(fisher)),
        };

        msg.channel_id.send_message(&ctx.http, message).await?;

        Ok(())
    }

    /// Attaches the image of `item`, if there is one, to `embed`.
    async fn with_image(
        &self,
        message: CreateMessage,
        embed: CreateEmbed,
        item: &str,
        thumbnail: bool,
    ) -> Result<CreateMessage> {
        let Some(path) = assets::find_image(&self.bot.config.assets_dir, item) else {
            return Ok(message.embed(embed));
        };

        let attachment = CreateAttachment::path(&path)
            .await
            .wrap_err_with(|| format!("could not read {}", path.display()))?;
        let url = format!("attachment://{}", attachment.filename);
        let embed = if thumbnail {
            embed.thumbnail(url)
        } else {
            embed.image(url)
        };

        Ok(message.add_file(attachment).embed(embed))
    }

    async fn fish_stats(&self, ctx: &Context, msg: &Message, target: Option<u64>) -> Result<()> {
        let author = msg.author.id.get();
        let target = target.filter(|id| *id != 0).unwrap_or(author);
        let name = if target == author {
            display_name(msg)
        } else {
            member_name(ctx, msg.guild_id, target).unwrap_or_else(|| self.bot.name_of(target))
        };

        let key = target.to_string();
        let leaderboard = database::fish_leaderboard(&self.bot.db, 10).await?;
        let stats = database::user_stats(&self.bot.db, &key).await?;
        let biggest = database::biggest_catch(&self.bot.db, &key).await?;

        let ranking = if leaderboard.is_empty() {
            format!("No catches yet! Be the first with `{}fish`", self.bot.config.prefix)
        } else {
            render::ranking(leaderboard.iter().map(|entry| {
                (
                    entry.user_name.as_str(),
                    entry.total_points.max(0) as u64,
                    entry.catches.max(0) as u64,
                )
            }))
        };

        let embed = CreateEmbed::new()
            .title("🏆 Fishing Leaderboard")
            .field("Top 10 Anglers", ranking, false)
            .field(
                format!("{name}'s Stats"),
                render::angler_stats(&stats, biggest.as_ref()),
                false,
            )
            .color(GOLD);

        let message = match biggest.filter(|catch| catch.catch_type == FISH) {
            Some(catch) => {
                self.with_image(CreateMessage::new(), embed, &catch.catch_name, true)
                    .await?
            }
            None => CreateMessage::new().embed(embed),
        };
        msg.channel_id.send_message(&ctx.http, message).await?;

        Ok(())
    }

    async fn fish_info(&self, ctx: &Context, msg: &Message, name: &str) -> Result<()> {
        let settings = self.bot.engine.settings();
        let Some(item) = settings.catalog.find(name) else {
            return reply(ctx, msg, render::fish_not_found(&settings.catalog, name)).await;
        };

        let embed = CreateEmbed::new()
            .title(format!("🐟 {}", item.name))
            .description(render::fish_card(&settings.catalog, item))
            .color(settings.catalog.rarity_of(item).color);

        let dir = &self.bot.config.assets_dir;
        let message = if assets::find_image(dir, &item.name).is_some() {
            self.with_image(CreateMessage::new(), embed, &item.name, false)
                .await?
        } else {
            CreateMessage::new().embed(embed.footer(CreateEmbedFooter::new(format!(
                "No image found in {}",
                dir.display()
            ))))
        };
        msg.channel_id.send_message(&ctx.http, message).await?;

        Ok(())
    }

    async fn add_fish(&self, ctx: &Context, msg: &Message, fish: NewFish) -> Result<()> {
        let dir = &self.bot.config.assets_dir;
        let Some(path) = assets::find_image(dir, &fish.name) else {
            return reply(
                ctx,
                msg,
                format!(
                    "❌ No image found in `{}` matching '{}'. Upload the image first.",
                    dir.display(),
                    fish.name
                ),
            )
            .await;
        };

        let name = assets::item_name(&path).unwrap_or_else(|| fish.name.clone());
        if self.bot.engine.settings().catalog.find(&name).is_some() {
            return reply(ctx, msg, format!("❌ A fish named '{name}' already exists.")).await;
        }

        let rarity = fish.rarity.unwrap_or_else(|| "common".to_string());
        let added = self.bot.update_game_config(|game| {
            game.fish.push(FishConfig {
                name: name.clone(),
                rarity: rarity.clone(),
                min_size_cm: fish.min_size_cm,
                max_size_cm: fish.max_size_cm,
                min_weight_kg: fish.min_weight_kg,
                max_weight_kg: fish.max_weight_kg,
                description: String::new(),
            })
        });

        match added {
            Ok(()) => {
                info!("{} added {name} ({rarity})", msg.author.name);
                reply(
                    ctx,
                    msg,
                    format!("✅ Added **{name}** ({rarity}) to the fishing config!"),
                )
                .await
            }
            Err(err) => self.config_rejected(ctx, msg, err).await,
        }
    }

    /// Reports a config the engine refused; anything else is a real error.
    async fn config_rejected(&self, ctx: &Context, msg: &Message, err: config::Error) -> Result<()> {
        match err {
            config::Error::Invalid { source, .. } => {
                reply(ctx, msg, format!("❌ Config not changed: {source}")).await
            }
            config::Error::Read { .. } => {
                warn!("{:#}", eyre::Report::new(err));
                reply(ctx, msg, "❌ Could not read the fishing config, keeping the current one.").await
            }
            err => Err(err.into()),
        }
    }

    async fn test_member_catch(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let members = guild_members(ctx, msg.guild_id);
        let catch = sampler::catch_member(
            &members,
            msg.author.id.get(),
            false,
            &mut rand::thread_rng(),
        );

        let Some(catch) = catch else {
            return reply(ctx, msg, "No other members available to catch!").await;
        };

        let mut embed = CreateEmbed::new()
            .title("🎣 TEST: You caught a server member!")
            .description(render::member_catch(&display_name(msg), &catch))
            .footer(CreateEmbedFooter::new("Test catch, not recorded."))
            .color(GOLD);
        if let Some(face) = avatar(ctx, msg.guild_id, catch.member.id) {
            embed = embed.thumbnail(face);
        }

        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }

    async fn start_contest(
        &self,
        ctx: &Context,
        msg: &Message,
        duration: std::time::Duration,
        delay: std::time::Duration,
    ) -> Result<()> {
        let now = Utc::now();
        let duration = Duration::from_std(duration).wrap_err("contest duration out of range")?;
        let start = now + Duration::from_std(delay).wrap_err("contest delay out of range")?;
        let channel = msg.channel_id;

        let scheduled = self.bot.schedule_contest(start, duration, now, |id| Room {
            name: format!(
                "Fishing Contest #{id} - {} UTC",
                start.format("%Y-%m-%d %H:%M")
            ),
            channel,
            thread: None,
        });

        let (id, room) = match scheduled {
            Ok(scheduled) => scheduled,
            Err(ContestError::AlreadyRunning { id, status }) => {
                return reply(
                    ctx,
                    msg,
                    format!("❌ Contest #{id} is already {status}! Cancel it first."),
                )
                .await;
            }
            Err(err) => return reply(ctx, msg, format!("❌ {err}")).await,
        };
        info!("{} scheduled contest #{id} for {start}", msg.author.name);

        database::create_contest(
            &self.bot.db,
            &NewContest {
                id: db_id(id),
                name: room.name.clone(),
                start_time: start,
                end_time: start + duration,
                channel_id: Some(channel.to_string()),
                created_by: msg.author.id.to_string(),
            },
        )
        .await?;

        let embed = CreateEmbed::new()
            .title("🎣 Fishing Contest Scheduled!")
            .description(render::contest_scheduled(
                start,
                duration,
                &format!("<#{channel}>"),
                &self.bot.config.prefix,
            ))
            .color(BLUE);
        channel
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }

    async fn join_contest(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let now = Utc::now();
        let user = msg.author.id.get();

        let count = match self.bot.engine.join_contest(user, now) {
            Ok(count) => count,
            Err(ContestError::AlreadyJoined(_)) => {
                return reply(ctx, msg, "You're already registered for the contest!").await;
            }
            Err(ContestError::NotScheduled) => {
                return reply(
                    ctx,
                    msg,
                    "No contest is open for joining. Ask an admin to start one!",
                )
                .await;
            }
            Err(err) => return Err(err.into()),
        };

        let Some(contest) = self.bot.engine.current_contest(now) else {
            return Ok(());
        };
        database::add_participant(
            &self.bot.db,
            db_id(contest.id),
            &user.to_string(),
            &display_name(msg),
            now,
        )
        .await?;

        reply(
            ctx,
            msg,
            format!(
                "✅ <@{user}> joined the fishing contest! ({count} participants)\nContest starts {}",
                render::relative_time(contest.start_time)
            ),
        )
        .await
    }

    async fn contest_info(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let prefix = &self.bot.config.prefix;
        let Some(contest) = self.bot.engine.current_contest(Utc::now()) else {
            return reply(
                ctx,
                msg,
                format!("No contest is currently scheduled. Admins can start one with `{prefix}startcontest`."),
            )
            .await;
        };

        let room = self.bot.room(contest.id);
        let title = room
            .as_ref()
            .map_or_else(|| format!("Fishing Contest #{}", contest.id), |room| room.name.clone());
        let mut embed = CreateEmbed::new()
            .title(format!("🎣 {title}"))
            .description(render::contest_status(&contest, prefix))
            .color(TEAL);
        if let Some(thread) = room.and_then(|room| room.thread) {
            embed = embed.field("Thread", format!("<#{thread}>"), false);
        }

        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }

    async fn contest_leaderboard(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let Some(contest) = self
            .bot
            .engine
            .current_contest(Utc::now())
            .filter(|contest| contest.is_active())
        else {
            return reply(ctx, msg, "No contest is currently active!").await;
        };

        let standings = self.bot.engine.leaderboard(contest.id)?;
        let names: Vec<_> = standings
            .iter()
            .map(|standing| self.bot.name_of(standing.user))
            .collect();

        let mut text = if standings.is_empty() {
            "No catches yet! Get fishing!".to_string()
        } else {
            render::ranking(
                standings
                    .iter()
                    .zip(&names)
                    .take(10)
                    .map(|(standing, name)| (name.as_str(), standing.points, standing.catches as u64)),
            )
        };
        text.push_str(&format!(
            "\n\nContest ends {}",
            render::relative_time(contest.end_time())
        ));

        let embed = CreateEmbed::new()
            .title("🏆 Live Contest Leaderboard")
            .description(text)
            .color(GOLD);
        msg.channel_id
            .send_message(
                &ctx.http,
                CreateMessage::new()
                    .embed(embed)
                    .flags(MessageFlags::SUPPRESS_NOTIFICATIONS),
            )
            .await?;

        Ok(())
    }

    async fn past_contests(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let contests = database::past_contests(&self.bot.db, 10).await?;
        if contests.is_empty() {
            return reply(ctx, msg, "No contests have been completed yet.").await;
        }

        let embed = CreateEmbed::new()
            .title("📜 Past Fishing Contests")
            .description(
                contests
                    .iter()
                    .map(render::past_contest)
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
            .footer(CreateEmbedFooter::new(format!(
                "Use {}contestresults <id> for details",
                self.bot.config.prefix
            )))
            .color(BLUE);
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }

    async fn contest_results(&self, ctx: &Context, msg: &Message, id: u64) -> Result<()> {
        let id = db_id(id);
        let Some(contest) = database::contest_by_id(&self.bot.db, id).await? else {
            return reply(ctx, msg, format!("Contest #{id} not found.")).await;
        };
        if contest.ended_at.is_none() {
            return reply(ctx, msg, format!("Contest #{id} hasn't finished yet.")).await;
        }

        let mut embed = CreateEmbed::new()
            .title(format!("📊 {}", contest.name))
            .color(if contest.cancelled { RED } else { GOLD });

        if contest.cancelled {
            embed = embed.description("❌ This contest was cancelled.");
        } else {
            let standings = database::contest_leaderboard(&self.bot.db, id, 10).await?;
            let ranking = if standings.is_empty() {
                "No fish were caught during this contest!".to_string()
            } else {
                render::ranking(standings.iter().map(|standing| {
                    (
                        standing.user_name.as_str(),
                        standing.total_points.max(0) as u64,
                        standing.catches.max(0) as u64,
                    )
                }))
            };

            embed = embed.description(ranking).field(
                "Contest Stats",
                format!(
                    "**Participants:** {}\n**Total Catches:** {}\n**Started:** {}",
                    contest.total_participants,
                    contest.total_catches,
                    render::full_time(contest.start_time)
                ),
                false,
            );
        }

        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }

    async fn cancel_contest(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let now = Utc::now();
        let id = match self.bot.engine.cancel_contest(now) {
            Ok(id) => id,
            Err(ContestError::NothingToCancel) => {
                return reply(ctx, msg, "No contest is currently scheduled or active.").await;
            }
            Err(err) => return Err(err.into()),
        };
        info!("{} cancelled contest #{id}", msg.author.name);

        let contest = self.bot.engine.contest(id);
        database::finish_contest(
            &self.bot.db,
            db_id(id),
            &ContestSummary {
                winner_id: None,
                winner_name: None,
                total_participants: contest
                    .as_ref()
                    .map_or(0, |contest| contest.participants.len() as i64),
                total_catches: contest
                    .as_ref()
                    .map_or(0, |contest| contest.catches.len() as i64),
                cancelled: true,
                ended_at: now,
            },
        )
        .await?;

        if let Some(Room {
            name,
            thread: Some(thread),
            ..
        }) = self.bot.close_room(id)
        {
            let archived = async {
                thread
                    .say(&ctx.http, "❌ This contest has been cancelled.")
                    .await?;
                thread
                    .edit_thread(
                        &ctx.http,
                        EditThread::new()
                            .name(render::thread_name(&format!("🎣 {name} [CANCELLED]")))
                            .locked(true)
                            .archived(true)
                            .audit_log_reason("Fishing contest cancelled"),
                    )
                    .await
            };
            if let Err(err) = archived.await {
                warn!("Could not archive thread of contest #{id}: {err}");
            }
        }

        let embed = CreateEmbed::new()
            .title("❌ Contest Cancelled")
            .description(format!("Contest #{id} has been cancelled."))
            .color(RED);
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }
}

async fn reply(ctx: &Context, msg: &Message, content: impl Into<String>) -> Result<()> {
    for chunk in render::split_message(&content.into(), render::MESSAGE_LIMIT) {
        msg.channel_id.say(&ctx.http, chunk).await?;
    }

    Ok(())
}

async fn is_admin(ctx: &Context, msg: &Message) -> Result<bool> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(false);
    };

    let member = guild_id
        .member(ctx, msg.author.id)
        .await
        .wrap_err("could not fetch member")?;

    Ok(ctx.cache.guild(guild_id).map_or(false, |guild| {
        let permissions = guild.member_permissions(&member);
        permissions.administrator() || permissions.manage_guild()
    }))
}

fn display_name(msg: &Message) -> String {
    msg.member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .or_else(|| msg.author.global_name.clone())
        .unwrap_or_else(|| msg.author.name.clone())
}

/// Members of the guild that can end up on a hook.
fn guild_members(ctx: &Context, guild_id: Option<GuildId>) -> Vec<fishing_engine::Member> {
    guild_id
        .and_then(|id| ctx.cache.guild(id))
        .map(|guild| {
            guild
                .members
                .values()
                .map(|member| fishing_engine::Member {
                    id: member.user.id.get(),
                    name: member.display_name().to_string(),
                    is_bot: member.user.bot,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn member_name(ctx: &Context, guild_id: Option<GuildId>, user: u64) -> Option<String> {
    let guild = ctx.cache.guild(guild_id?)?;
    let member = guild.members.get(&UserId::new(user))?;

    Some(member.display_name().to_string())
}

fn avatar(ctx: &Context, guild_id: Option<GuildId>, user: u64) -> Option<String> {
    let guild = ctx.cache.guild(guild_id?)?;
    let member = guild.members.get(&UserId::new(user))?;

    Some(member.face())
}
