//! Per-turn countdown.
//!
//! The timer does not own a clock. Whoever hosts the game sends a tick every
//! `sample_rate` and the timer reports what that tick meant; the rule engine
//! turns an [`TickOutcome::Expired`] into a forced turn advance.

use crate::game::GameError;
use crate::lifecycle::GameStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether the countdown is being sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    Idle,
    Running,
}

/// Result of one sample tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Timer not running; the tick was ignored
    Ignored,
    /// Time decremented, turn continues
    Counting,
    /// Time ran out; sampling is paused until [`TurnTimer::resume`]
    Expired,
    /// Game already completed; remaining time frozen at zero
    Frozen,
}

/// Countdown for the current turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnTimer {
    time_limit: Duration,
    sample_rate: Duration,
    remaining: Duration,
    state: TimerState,
}

impl TurnTimer {
    /// Create an idle timer.
    ///
    /// The limit must be positive and the sample rate must not be negative.
    pub fn new(time_limit_ms: i64, sample_rate_ms: i64) -> Result<Self, GameError> {
        if sample_rate_ms < 0 {
            return Err(GameError::InvalidSampleRate(sample_rate_ms));
        }
        if time_limit_ms <= 0 {
            return Err(GameError::InvalidTimeLimit(time_limit_ms));
        }

        let time_limit = Duration::from_millis(time_limit_ms.unsigned_abs());
        Ok(Self {
            time_limit,
            sample_rate: Duration::from_millis(sample_rate_ms.unsigned_abs()),
            remaining: time_limit,
            state: TimerState::Idle,
        })
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn sample_rate(&self) -> Duration {
        self.sample_rate
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Start sampling when the game goes in progress, stop otherwise.
    ///
    /// Safe to call repeatedly with the same status.
    pub fn on_status_changed(&mut self, status: GameStatus) {
        match status {
            GameStatus::InProgress => self.state = TimerState::Running,
            GameStatus::Completed => {
                self.state = TimerState::Idle;
                self.remaining = Duration::ZERO;
            }
            GameStatus::New => self.state = TimerState::Idle,
        }
    }

    /// Sample the countdown once
    pub fn tick(&mut self, status: GameStatus) -> TickOutcome {
        if self.state == TimerState::Idle {
            return TickOutcome::Ignored;
        }

        self.remaining = self.remaining.saturating_sub(self.sample_rate);

        if status == GameStatus::Completed {
            self.remaining = Duration::ZERO;
            self.state = TimerState::Idle;
            return TickOutcome::Frozen;
        }

        if self.remaining.is_zero() {
            self.state = TimerState::Idle;
            return TickOutcome::Expired;
        }

        TickOutcome::Counting
    }

    /// Restore the full limit for a new turn
    pub fn reset(&mut self) {
        self.remaining = self.time_limit;
    }

    /// Resume sampling after an expiry, if the game is still in progress
    pub fn resume(&mut self, status: GameStatus) {
        if status == GameStatus::InProgress {
            self.state = TimerState::Running;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(TurnTimer::new(0, 100), Err(GameError::InvalidTimeLimit(0))));
        assert!(matches!(TurnTimer::new(-5, 100), Err(GameError::InvalidTimeLimit(-5))));
        assert!(matches!(TurnTimer::new(1000, -1), Err(GameError::InvalidSampleRate(-1))));
        assert!(TurnTimer::new(1000, 0).is_ok());
    }

    #[test]
    fn test_idle_until_in_progress() {
        let mut timer = TurnTimer::new(1000, 250).unwrap();
        assert_eq!(timer.tick(GameStatus::New), TickOutcome::Ignored);
        assert_eq!(timer.remaining(), Duration::from_millis(1000));

        timer.on_status_changed(GameStatus::InProgress);
        assert!(timer.is_running());
        assert_eq!(timer.tick(GameStatus::InProgress), TickOutcome::Counting);
        assert_eq!(timer.remaining(), Duration::from_millis(750));
    }

    #[test]
    fn test_expires_after_limit() {
        let mut timer = TurnTimer::new(1000, 250).unwrap();
        timer.on_status_changed(GameStatus::InProgress);

        for _ in 0..3 {
            assert_eq!(timer.tick(GameStatus::InProgress), TickOutcome::Counting);
        }
        assert_eq!(timer.tick(GameStatus::InProgress), TickOutcome::Expired);
        assert!(!timer.is_running());

        // Paused until the host resumes it
        assert_eq!(timer.tick(GameStatus::InProgress), TickOutcome::Ignored);

        timer.reset();
        timer.resume(GameStatus::InProgress);
        assert_eq!(timer.remaining(), Duration::from_millis(1000));
        assert!(timer.is_running());
    }

    #[test]
    fn test_uneven_sample_rate_expires_below_zero() {
        let mut timer = TurnTimer::new(1000, 300).unwrap();
        timer.on_status_changed(GameStatus::InProgress);

        let outcomes: Vec<_> = (0..4).map(|_| timer.tick(GameStatus::InProgress)).collect();
        assert_eq!(outcomes.last(), Some(&TickOutcome::Expired));
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_sample_rate_never_expires() {
        let mut timer = TurnTimer::new(10, 0).unwrap();
        timer.on_status_changed(GameStatus::InProgress);
        for _ in 0..100 {
            assert_eq!(timer.tick(GameStatus::InProgress), TickOutcome::Counting);
        }
    }

    #[test]
    fn test_frozen_once_completed() {
        let mut timer = TurnTimer::new(1000, 250).unwrap();
        timer.on_status_changed(GameStatus::InProgress);
        timer.tick(GameStatus::InProgress);

        assert_eq!(timer.tick(GameStatus::Completed), TickOutcome::Frozen);
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert_eq!(timer.tick(GameStatus::Completed), TickOutcome::Ignored);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut timer = TurnTimer::new(1000, 250).unwrap();
        timer.on_status_changed(GameStatus::InProgress);
        timer.on_status_changed(GameStatus::Completed);
        timer.on_status_changed(GameStatus::Completed);

        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert_eq!(timer.tick(GameStatus::Completed), TickOutcome::Ignored);
    }
}
