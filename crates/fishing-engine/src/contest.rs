use std::{collections::BTreeSet, fmt::Display};

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::{sampler::CatchOutcome, settings::CONTEST_BONUS, UserId};

pub type ContestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContestStatus {
    Scheduled,
    Starting,
    Active,
    Ended,
}

impl Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "scheduled",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Ended => "ended",
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContestError {
    #[error("Contest #{id} is already {status}")]
    AlreadyRunning { id: ContestId, status: ContestStatus },

    #[error("Contest duration must be positive")]
    InvalidDuration,

    #[error("No contest is open for joining")]
    NotScheduled,

    #[error("Already joined contest #{0}")]
    AlreadyJoined(ContestId),

    #[error("No contest to cancel")]
    NothingToCancel,

    #[error("Contest #{0} not found")]
    NotFound(ContestId),
}

/// A catch logged while a contest was active.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestCatch {
    pub user: UserId,
    pub outcome: CatchOutcome,
    pub points: u32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contest {
    pub id: ContestId,
    pub status: ContestStatus,
    pub created_at: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    pub participants: BTreeSet<UserId>,
    pub catches: Vec<ContestCatch>,
    pub cancelled: bool,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Contest {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    pub fn bonus_multiplier(&self) -> f64 {
        CONTEST_BONUS
    }

    pub fn is_active(&self) -> bool {
        self.status == ContestStatus::Active
    }

    /// The state this contest should move to at `now`, one step at a time.
    fn next_status(&self, now: DateTime<Utc>, countdown: Duration) -> Option<ContestStatus> {
        match self.status {
            ContestStatus::Scheduled
                if self
                    .start_time
                    .checked_sub_signed(countdown)
                    .map_or(true, |opens| now >= opens) =>
            {
                Some(ContestStatus::Starting)
            }
            ContestStatus::Starting if now >= self.start_time => Some(ContestStatus::Active),
            ContestStatus::Active if now >= self.end_time() => Some(ContestStatus::Ended),
            _ => None,
        }
    }

    /// Points per user, highest first.
    ///
    /// Equal totals are ordered by who reached their total first.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let mut standings: Vec<(Standing, usize)> = Vec::new();

        for (sequence, catch) in self.catches.iter().enumerate() {
            let index = match standings.iter().position(|(s, _)| s.user == catch.user) {
                Some(index) => index,
                None => {
                    standings.push((
                        Standing {
                            user: catch.user,
                            points: 0,
                            catches: 0,
                            best_catch: 0,
                            reached_at: catch.at,
                        },
                        sequence,
                    ));
                    standings.len() - 1
                }
            };

            let (standing, reached) = &mut standings[index];
            standing.catches += 1;
            standing.best_catch = standing.best_catch.max(catch.points);
            if catch.points > 0 {
                standing.points += u64::from(catch.points);
                standing.reached_at = catch.at;
                *reached = sequence;
            }
        }

        standings.sort_by(|(a, a_seq), (b, b_seq)| {
            b.points
                .cmp(&a.points)
                .then(a.reached_at.cmp(&b.reached_at))
                .then(a_seq.cmp(b_seq))
        });

        standings.into_iter().map(|(standing, _)| standing).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub user: UserId,
    pub points: u64,
    pub catches: usize,
    pub best_catch: u32,
    /// When the user reached their current total.
    pub reached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub contest: ContestId,
    pub from: ContestStatus,
    pub to: ContestStatus,
    pub at: DateTime<Utc>,
}

/// Owns the single open contest and the history of ended ones.
///
/// Time based transitions are evaluated by [`ContestCoordinator::advance`],
/// which every operation calls first, so an expired contest is ended even if
/// nobody ticks it.
#[derive(Debug)]
pub struct ContestCoordinator {
    current: Option<Contest>,
    history: Vec<Contest>,
    next_id: ContestId,
    countdown: Duration,
    pending: Vec<Transition>,
}

impl ContestCoordinator {
    pub fn new(countdown: Duration) -> Self {
        Self::starting_at(1, countdown)
    }

    /// Hands out contest ids beginning with `first_id`.
    pub fn starting_at(first_id: ContestId, countdown: Duration) -> Self {
        Self {
            current: None,
            history: Vec::new(),
            next_id: first_id,
            countdown,
            pending: Vec::new(),
        }
    }

    pub fn set_countdown(&mut self, countdown: Duration) {
        self.countdown = countdown;
    }

    /// Applies every transition due at `now`.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        while let Some(contest) = self.current.as_mut() {
            let Some(to) = contest.next_status(now, self.countdown) else {
                break;
            };

            let from = contest.status;
            contest.status = to;
            info!("Contest #{} is now {to}", contest.id);
            self.pending.push(Transition {
                contest: contest.id,
                from,
                to,
                at: now,
            });

            if to == ContestStatus::Ended {
                contest.ended_at = Some(contest.end_time().min(now));
                self.retire();
            }
        }
    }

    /// Drains the transitions observed since the last call.
    pub fn take_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.pending)
    }

    pub fn schedule(
        &mut self,
        start_time: DateTime<Utc>,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<ContestId, ContestError> {
        self.advance(now);

        if let Some(contest) = &self.current {
            return Err(ContestError::AlreadyRunning {
                id: contest.id,
                status: contest.status,
            });
        }

        if duration <= Duration::zero() || start_time.checked_add_signed(duration).is_none() {
            return Err(ContestError::InvalidDuration);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Contest {
            id,
            status: ContestStatus::Scheduled,
            created_at: now,
            start_time,
            duration,
            participants: BTreeSet::new(),
            catches: Vec::new(),
            cancelled: false,
            ended_at: None,
        });
        info!("Scheduled contest #{id} starting at {start_time} for {duration}");

        // a start time inside the countdown window moves straight on
        self.advance(now);

        Ok(id)
    }

    /// Adds `user` to the scheduled contest and returns the participant count.
    pub fn join(&mut self, user: UserId, now: DateTime<Utc>) -> Result<usize, ContestError> {
        self.advance(now);

        let contest = self
            .current
            .as_mut()
            .filter(|contest| contest.status == ContestStatus::Scheduled)
            .ok_or(ContestError::NotScheduled)?;

        if !contest.participants.insert(user) {
            return Err(ContestError::AlreadyJoined(contest.id));
        }
        debug!("{user} joined contest #{}", contest.id);

        Ok(contest.participants.len())
    }

    /// Ends the open contest immediately.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<ContestId, ContestError> {
        self.advance(now);

        let contest = self
            .current
            .as_mut()
            .ok_or(ContestError::NothingToCancel)?;
        let id = contest.id;

        self.pending.push(Transition {
            contest: id,
            from: contest.status,
            to: ContestStatus::Ended,
            at: now,
        });
        contest.status = ContestStatus::Ended;
        contest.cancelled = true;
        contest.ended_at = Some(now);
        info!("Contest #{id} was cancelled");
        self.retire();

        Ok(id)
    }

    /// The contest currently accepting catches, as of the last advance.
    pub fn active(&self) -> Option<&Contest> {
        self.current.as_ref().filter(|contest| contest.is_active())
    }

    /// Appends `catch` to the active contest's log.
    pub fn log_catch(&mut self, catch: ContestCatch) -> Option<ContestId> {
        let contest = self.current.as_mut().filter(|contest| contest.is_active())?;
        contest.catches.push(catch);
        Some(contest.id)
    }

    pub fn current(&self) -> Option<&Contest> {
        self.current.as_ref()
    }

    pub fn get(&self, id: ContestId) -> Option<&Contest> {
        self.current
            .iter()
            .chain(self.history.iter())
            .find(|contest| contest.id == id)
    }

    /// Ended contests, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Contest> {
        self.history.iter().rev()
    }

    pub fn leaderboard(&self, id: ContestId) -> Result<Vec<Standing>, ContestError> {
        self.get(id)
            .map(Contest::leaderboard)
            .ok_or(ContestError::NotFound(id))
    }

    fn retire(&mut self) {
        if let Some(contest) = self.current.take() {
            self.history.push(contest);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;
    use crate::sampler::ItemCatch;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn catch(user: UserId, points: u32, secs: i64) -> ContestCatch {
        ContestCatch {
            user,
            outcome: CatchOutcome::Item(ItemCatch {
                name: "Bass".to_string(),
                rarity: "common".to_string(),
                size_cm: 30.0,
                weight_kg: 1.0,
                points,
            }),
            points,
            at: at(secs),
        }
    }

    /// Contest starting at 300s for 600s with a 60s countdown.
    fn scheduled() -> ContestCoordinator {
        let mut coordinator = ContestCoordinator::new(Duration::seconds(60));
        coordinator
            .schedule(at(300), Duration::seconds(600), at(0))
            .unwrap();
        coordinator
    }

    #[test_case(0, Some(ContestStatus::Scheduled))]
    #[test_case(239, Some(ContestStatus::Scheduled))]
    #[test_case(240, Some(ContestStatus::Starting))]
    #[test_case(299, Some(ContestStatus::Starting))]
    #[test_case(300, Some(ContestStatus::Active))]
    #[test_case(899, Some(ContestStatus::Active))]
    #[test_case(900, None ; "ended and retired")]
    fn status_follows_the_clock(secs: i64, expected: Option<ContestStatus>) {
        let mut coordinator = scheduled();
        coordinator.advance(at(secs));

        assert_eq!(coordinator.current().map(|c| c.status), expected);
    }

    #[test]
    fn late_advance_walks_every_state() {
        let mut coordinator = scheduled();
        coordinator.take_transitions();

        coordinator.advance(at(10_000));

        let steps: Vec<_> = coordinator
            .take_transitions()
            .into_iter()
            .map(|t| (t.from, t.to))
            .collect();
        assert_eq!(
            steps,
            vec![
                (ContestStatus::Scheduled, ContestStatus::Starting),
                (ContestStatus::Starting, ContestStatus::Active),
                (ContestStatus::Active, ContestStatus::Ended),
            ]
        );

        let ended = coordinator.get(1).unwrap();
        assert_eq!(ended.status, ContestStatus::Ended);
        assert!(!ended.cancelled);
        assert_eq!(ended.ended_at, Some(at(900)));
        assert!(coordinator.take_transitions().is_empty());
    }

    #[test]
    fn countdown_longer_than_the_calendar_starts_at_once() {
        let mut coordinator = ContestCoordinator::new(Duration::max_value());

        coordinator
            .schedule(at(300), Duration::seconds(600), at(0))
            .unwrap();

        assert_eq!(
            coordinator.current().map(|c| c.status),
            Some(ContestStatus::Starting)
        );
    }

    #[test_case(0 ; "while scheduled")]
    #[test_case(250 ; "while starting")]
    #[test_case(400 ; "while active")]
    fn rejects_second_contest(secs: i64) {
        let mut coordinator = scheduled();

        let err = coordinator
            .schedule(at(secs + 100), Duration::seconds(60), at(secs))
            .unwrap_err();

        assert!(matches!(err, ContestError::AlreadyRunning { id: 1, .. }));
        assert_eq!(coordinator.current().map(|c| c.id), Some(1));
    }

    #[test]
    fn schedules_again_after_previous_ended() {
        let mut coordinator = scheduled();

        let id = coordinator
            .schedule(at(2_000), Duration::seconds(60), at(1_000))
            .unwrap();

        assert_eq!(id, 2);
        assert_eq!(coordinator.history().count(), 1);
    }

    #[test]
    fn rejects_empty_duration() {
        let mut coordinator = ContestCoordinator::new(Duration::seconds(60));

        assert_eq!(
            coordinator.schedule(at(100), Duration::zero(), at(0)),
            Err(ContestError::InvalidDuration)
        );
        assert!(coordinator.current().is_none());
    }

    #[test]
    fn rejects_duration_past_the_calendar() {
        let mut coordinator = ContestCoordinator::new(Duration::seconds(60));

        assert_eq!(
            coordinator.schedule(at(100), Duration::max_value(), at(0)),
            Err(ContestError::InvalidDuration)
        );
    }

    #[test]
    fn join_only_while_scheduled() {
        let mut coordinator = scheduled();

        assert_eq!(coordinator.join(7, at(10)), Ok(1));
        assert_eq!(coordinator.join(8, at(20)), Ok(2));
        assert_eq!(coordinator.join(7, at(30)), Err(ContestError::AlreadyJoined(1)));
        assert_eq!(coordinator.join(9, at(250)), Err(ContestError::NotScheduled));
    }

    #[test]
    fn logs_catches_only_while_active() {
        let mut coordinator = scheduled();

        coordinator.advance(at(250));
        assert_eq!(coordinator.log_catch(catch(1, 10, 250)), None);

        coordinator.advance(at(310));
        assert_eq!(coordinator.log_catch(catch(1, 10, 310)), Some(1));
        assert_eq!(coordinator.active().map(|c| c.catches.len()), Some(1));
    }

    #[test]
    fn cancel_ends_immediately() {
        let mut coordinator = scheduled();
        coordinator.advance(at(400));
        coordinator.take_transitions();

        assert_eq!(coordinator.cancel(at(401)), Ok(1));

        assert!(coordinator.active().is_none());
        assert_eq!(coordinator.log_catch(catch(1, 10, 402)), None);
        let cancelled = coordinator.get(1).unwrap();
        assert!(cancelled.cancelled);
        assert_eq!(cancelled.ended_at, Some(at(401)));
        assert_eq!(
            coordinator.take_transitions(),
            vec![Transition {
                contest: 1,
                from: ContestStatus::Active,
                to: ContestStatus::Ended,
                at: at(401),
            }]
        );
        assert_eq!(coordinator.cancel(at(402)), Err(ContestError::NothingToCancel));
    }

    #[test]
    fn leaderboard_breaks_ties_by_who_got_there_first() {
        let mut coordinator = scheduled();
        coordinator.advance(at(300));
        coordinator.log_catch(catch(1, 10, 310));
        coordinator.log_catch(catch(2, 15, 320));
        coordinator.log_catch(catch(1, 5, 330));

        let board: Vec<_> = coordinator
            .leaderboard(1)
            .unwrap()
            .into_iter()
            .map(|s| (s.user, s.points))
            .collect();

        assert_eq!(board, vec![(2, 15), (1, 15)]);
    }

    #[test]
    fn leaderboard_sums_points() {
        let mut coordinator = scheduled();
        coordinator.advance(at(300));
        coordinator.log_catch(catch(1, 10, 310));
        coordinator.log_catch(catch(2, 30, 320));
        coordinator.log_catch(catch(1, 25, 330));
        coordinator.log_catch(catch(3, 5, 340));

        let board = coordinator.leaderboard(1).unwrap();

        assert_eq!(board[0].user, 1);
        assert_eq!(board[0].points, 35);
        assert_eq!(board[0].catches, 2);
        assert_eq!(board[0].best_catch, 25);
        assert_eq!(board[1].user, 2);
        assert_eq!(board[2].user, 3);
    }

    #[test]
    fn leaderboard_of_unknown_contest() {
        let coordinator = scheduled();

        assert_eq!(coordinator.leaderboard(42), Err(ContestError::NotFound(42)));
        assert_eq!(coordinator.leaderboard(1), Ok(Vec::new()));
    }

    #[test]
    fn ids_continue_from_given_start() {
        let mut coordinator = ContestCoordinator::starting_at(17, Duration::seconds(60));

        assert_eq!(
            coordinator.schedule(at(300), Duration::seconds(60), at(0)),
            Ok(17)
        );
    }
}
