use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::UserId;

/// Per-user timestamp of the last attempt that passed the gate.
#[derive(Debug, Default)]
pub struct CooldownGate {
    last_attempt: HashMap<UserId, DateTime<Utc>>,
}

impl CooldownGate {
    /// Time left before `user` may fish again, `None` if they may fish now.
    ///
    /// A zero cooldown disables the gate.
    pub fn remaining(&self, user: UserId, now: DateTime<Utc>, cooldown: Duration) -> Option<Duration> {
        let last = self.last_attempt.get(&user)?;
        let remaining = cooldown - (now - *last);

        (remaining > Duration::zero()).then_some(remaining)
    }

    pub fn allowed(&self, user: UserId, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.remaining(user, now, cooldown).is_none()
    }

    pub fn record(&mut self, user: UserId, now: DateTime<Utc>) {
        self.last_attempt.insert(user, now);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn first_attempt_is_allowed() {
        let gate = CooldownGate::default();

        assert!(gate.allowed(1, at(0), Duration::seconds(30)));
    }

    #[test_case(10, 30, Some(20) ; "within cooldown")]
    #[test_case(30, 30, None ; "exactly at cooldown")]
    #[test_case(45, 30, None ; "after cooldown")]
    #[test_case(1, 0, None ; "disabled")]
    fn remaining(elapsed: i64, cooldown: i64, expected: Option<i64>) {
        let mut gate = CooldownGate::default();
        gate.record(1, at(0));

        assert_eq!(
            gate.remaining(1, at(elapsed), Duration::seconds(cooldown)),
            expected.map(Duration::seconds)
        );
    }

    #[test]
    fn users_do_not_share_cooldowns() {
        let mut gate = CooldownGate::default();
        gate.record(1, at(0));

        assert!(!gate.allowed(1, at(5), Duration::seconds(30)));
        assert!(gate.allowed(2, at(5), Duration::seconds(30)));
    }
}
