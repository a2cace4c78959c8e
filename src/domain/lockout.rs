//! Per-account login lockout state machine.
//!
//! States are `Active` and `Locked(until)`. Only failed and successful
//! password checks move between them; a rejection while locked leaves the
//! counter alone.

use chrono::{DateTime, Duration, Utc};

use crate::config::{LOCKOUT_DURATION_MINUTES, MAX_FAILED_LOGIN_ATTEMPTS};

/// Persisted lockout fields of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginState {
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginState {
    pub const CLEAR: LoginState = LoginState {
        failed_attempts: 0,
        locked_until: None,
    };
}

/// Result of recording one wrong password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still active, with this many attempts left before the lock.
    Rejected { next: LoginState, attempts_remaining: i32 },
    /// The threshold was reached and the account is now locked.
    Locked { next: LoginState, remaining_minutes: i64 },
}

impl FailureOutcome {
    pub fn next_state(&self) -> LoginState {
        match self {
            FailureOutcome::Rejected { next, .. } | FailureOutcome::Locked { next, .. } => *next,
        }
    }
}

/// Threshold and duration of the lockout.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_attempts: i32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            lock_duration: Duration::minutes(LOCKOUT_DURATION_MINUTES),
        }
    }
}

impl LockoutPolicy {
    /// Whole minutes left on an active lock, rounded up so a live lock never
    /// reports zero. `None` when the account is not locked at `now`.
    pub fn remaining_lock_minutes(&self, state: &LoginState, now: DateTime<Utc>) -> Option<i64> {
        let until = state.locked_until?;
        if until <= now {
            return None;
        }
        let seconds = (until - now).num_seconds();
        Some(((seconds + 59) / 60).max(1))
    }

    /// Apply one wrong password to `state`.
    ///
    /// Reaching `max_attempts` locks the account for `lock_duration` from
    /// `now`. An expired lock is not reset first, so a counter already at the
    /// threshold relocks on the next failure.
    pub fn register_failure(&self, state: &LoginState, now: DateTime<Utc>) -> FailureOutcome {
        let failed_attempts = state.failed_attempts.saturating_add(1);
        if failed_attempts >= self.max_attempts {
            FailureOutcome::Locked {
                next: LoginState {
                    failed_attempts,
                    locked_until: Some(now + self.lock_duration),
                },
                remaining_minutes: self.lock_duration.num_minutes(),
            }
        } else {
            FailureOutcome::Rejected {
                next: LoginState {
                    failed_attempts,
                    locked_until: state.locked_until,
                },
                attempts_remaining: self.max_attempts - failed_attempts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn four_failures_leave_one_attempt() {
        let policy = LockoutPolicy::default();
        let mut state = LoginState::CLEAR;
        for expected_remaining in [4, 3, 2, 1] {
            match policy.register_failure(&state, now()) {
                FailureOutcome::Rejected {
                    next,
                    attempts_remaining,
                } => {
                    assert_eq!(attempts_remaining, expected_remaining);
                    state = next;
                }
                other => panic!("locked too early: {other:?}"),
            }
        }
        assert_eq!(state.failed_attempts, 4);
        assert!(state.locked_until.is_none());
    }

    #[test]
    fn fifth_failure_locks_for_exactly_fifteen_minutes() {
        let policy = LockoutPolicy::default();
        let state = LoginState {
            failed_attempts: 4,
            locked_until: None,
        };
        match policy.register_failure(&state, now()) {
            FailureOutcome::Locked {
                next,
                remaining_minutes,
            } => {
                assert_eq!(next.failed_attempts, 5);
                assert_eq!(next.locked_until, Some(now() + Duration::minutes(15)));
                assert_eq!(remaining_minutes, 15);
            }
            other => panic!("expected lock, got {other:?}"),
        }
    }

    #[test]
    fn remaining_minutes_round_up_and_stay_positive() {
        let policy = LockoutPolicy::default();
        let state = LoginState {
            failed_attempts: 5,
            locked_until: Some(now() + Duration::seconds(30)),
        };
        assert_eq!(policy.remaining_lock_minutes(&state, now()), Some(1));

        let state = LoginState {
            failed_attempts: 5,
            locked_until: Some(now() + Duration::minutes(15)),
        };
        assert_eq!(policy.remaining_lock_minutes(&state, now()), Some(15));
    }

    #[test]
    fn expired_lock_is_not_active() {
        let policy = LockoutPolicy::default();
        let state = LoginState {
            failed_attempts: 5,
            locked_until: Some(now() - Duration::seconds(1)),
        };
        assert_eq!(policy.remaining_lock_minutes(&state, now()), None);
    }

    #[test]
    fn failure_after_expired_lock_relocks() {
        let policy = LockoutPolicy::default();
        let state = LoginState {
            failed_attempts: 5,
            locked_until: Some(now() - Duration::minutes(1)),
        };
        assert!(matches!(
            policy.register_failure(&state, now()),
            FailureOutcome::Locked { .. }
        ));
    }
}
