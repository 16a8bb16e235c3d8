use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::Rng;

use crate::{
    contest::{Contest, ContestCatch, ContestCoordinator, ContestError, ContestId, Standing, Transition},
    cooldown::CooldownGate,
    recency::RecentCatches,
    sampler::{self, CatchOutcome, Member},
    settings::Settings,
    UserId,
};

/// The result of asking to fish.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Caught(CatchEvent),
    Cooldown { remaining: Duration },
}

/// Everything the surrounding system needs to persist a resolved attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchEvent {
    pub user: UserId,
    pub outcome: CatchOutcome,
    pub at: DateTime<Utc>,
    /// The contest this catch counts towards.
    pub contest: Option<ContestId>,
}

impl CatchEvent {
    pub fn points(&self) -> u32 {
        self.outcome.points()
    }
}

#[derive(Debug)]
struct State {
    cooldowns: CooldownGate,
    recent: RecentCatches,
    contests: ContestCoordinator,
}

/// The catch resolution engine.
///
/// Settings are an immutable snapshot swapped as a whole on reload. All
/// mutable state sits behind one lock so contest transitions, cooldown checks
/// and contest logging of a single attempt happen atomically.
#[derive(Debug)]
pub struct Engine {
    settings: RwLock<Arc<Settings>>,
    state: Mutex<State>,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self::with_first_contest_id(settings, 1)
    }

    /// Like [`Engine::new`] but numbers contests from `first_id`.
    pub fn with_first_contest_id(settings: Settings, first_id: ContestId) -> Self {
        let contests = ContestCoordinator::starting_at(first_id, settings.contest_countdown);

        Self {
            settings: RwLock::new(Arc::new(settings)),
            state: Mutex::new(State {
                cooldowns: CooldownGate::default(),
                recent: RecentCatches::default(),
                contests,
            }),
        }
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a new snapshot and returns the previous one.
    pub fn reload(&self, settings: Settings) -> Arc<Settings> {
        let countdown = settings.contest_countdown;
        let previous = std::mem::replace(
            &mut *self.settings.write().unwrap_or_else(PoisonError::into_inner),
            Arc::new(settings),
        );
        self.state().contests.set_countdown(countdown);

        info!(
            "Reloaded fishing settings with {} fish",
            self.settings().catalog.len()
        );

        previous
    }

    pub fn attempt_catch<R: Rng + ?Sized>(
        &self,
        user: UserId,
        now: DateTime<Utc>,
        members: &[Member],
        rng: &mut R,
    ) -> Attempt {
        let settings = self.settings();
        let mut state = self.state();

        state.contests.advance(now);
        let contest = state.contests.active().map(|contest| contest.id);

        if contest.is_none() {
            if let Some(remaining) = state.cooldowns.remaining(user, now, settings.cooldown) {
                debug!("{user} is on cooldown for another {remaining}");
                return Attempt::Cooldown { remaining };
            }
        }
        state.cooldowns.record(user, now);

        let outcome = sampler::resolve(
            &settings,
            state.recent.window(user),
            user,
            members,
            contest.is_some(),
            rng,
        );
        debug!("{user} caught {outcome}");

        if let CatchOutcome::Item(catch) = &outcome {
            state.recent.push(user, catch.name.clone());
        }

        let contest = if outcome.is_nothing() {
            None
        } else {
            state.contests.log_catch(ContestCatch {
                user,
                outcome: outcome.clone(),
                points: outcome.points(),
                at: now,
            })
        };

        Attempt::Caught(CatchEvent {
            user,
            outcome,
            at: now,
            contest,
        })
    }

    /// Applies due contest transitions and returns every transition since the
    /// previous tick, including ones applied lazily by other operations.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Transition> {
        let mut state = self.state();
        state.contests.advance(now);
        state.contests.take_transitions()
    }

    pub fn schedule_contest(
        &self,
        start_time: DateTime<Utc>,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<ContestId, ContestError> {
        self.state().contests.schedule(start_time, duration, now)
    }

    pub fn join_contest(&self, user: UserId, now: DateTime<Utc>) -> Result<usize, ContestError> {
        self.state().contests.join(user, now)
    }

    pub fn cancel_contest(&self, now: DateTime<Utc>) -> Result<ContestId, ContestError> {
        self.state().contests.cancel(now)
    }

    pub fn is_contest_active(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state();
        state.contests.advance(now);
        state.contests.active().is_some()
    }

    /// The open contest, if any.
    pub fn current_contest(&self, now: DateTime<Utc>) -> Option<Contest> {
        let mut state = self.state();
        state.contests.advance(now);
        state.contests.current().cloned()
    }

    pub fn contest(&self, id: ContestId) -> Option<Contest> {
        self.state().contests.get(id).cloned()
    }

    /// Ended contests, newest first.
    pub fn past_contests(&self) -> Vec<Contest> {
        self.state().contests.history().cloned().collect()
    }

    pub fn leaderboard(&self, id: ContestId) -> Result<Vec<Standing>, ContestError> {
        self.state().contests.leaderboard(id)
    }

    pub fn cooldown_remaining(&self, user: UserId, now: DateTime<Utc>) -> Option<Duration> {
        let cooldown = self.settings().cooldown;
        self.state().cooldowns.remaining(user, now, cooldown)
    }

    pub fn recent_catches(&self, user: UserId) -> Vec<String> {
        self.state()
            .recent
            .window(user)
            .map(|window| window.iter().map(String::from).collect())
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
